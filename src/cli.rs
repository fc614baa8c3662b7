//! Command-line interface for `ssm`.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use ssm_api::{LogKind, DEFAULT_DURATION_DAYS, DEFAULT_LOG_LIMIT, DEFAULT_MAX_PLAYERS};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ssm",
    about = "Terminal client for the Steam server manager backend",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to $XDG_CONFIG_HOME/ssm/ssm.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override `api.base_url` from the config file
    #[arg(long, global = true, env = "SSM_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SSM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Invalidate the session on the server and forget it locally
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Live CPU / memory / network view, refreshed every poll tick
    Watch {
        /// Print the first complete sample and exit
        #[arg(long)]
        once: bool,
    },
    /// Print the long-horizon history summary
    History,
    /// Check whether the backend has updates available
    GitStatus,
    /// Ask the backend to update itself and wait for its acknowledgement
    GitUpdate,
    /// Invite tokens
    #[command(subcommand)]
    Tokens(TokenCommand),
    /// Notifications
    #[command(subcommand)]
    Notifications(NotificationCommand),
    /// Game servers
    #[command(subcommand)]
    Servers(ServerCommand),
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Tokens assigned to you
    List,
    /// Redeem an invite code
    Activate { code: String },
    /// Mint a code for another user (manager admins only)
    Generate {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = DEFAULT_DURATION_DAYS)]
        days: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    List,
    /// Unread badge count
    Count,
    /// Mark one notification read
    Read { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ServerCommand {
    List,
    /// Show one server
    Show(ServerId),
    /// Register a new server
    Create(CreateServer),
    /// Change settings of an existing server
    Update(UpdateServer),
    Delete(ServerId),
    /// Live process status
    Status(ServerId),
    /// Recent log lines
    Logs {
        id: u64,
        #[arg(long, value_enum, default_value_t = LogStream::Runtime)]
        kind: LogStream,
        #[arg(long, default_value_t = DEFAULT_LOG_LIMIT)]
        limit: u32,
    },
    Start(ServerId),
    Stop(ServerId),
    Install(ServerId),
}

#[derive(ClapArgs, Debug)]
pub struct ServerId {
    pub id: u64,
}

#[derive(ClapArgs, Debug)]
pub struct CreateServer {
    #[arg(long)]
    pub name: String,
    /// ASE or ASA
    #[arg(long)]
    pub game_type: String,
    #[arg(long)]
    pub port: u16,
    #[arg(long)]
    pub query_port: Option<u16>,
    #[arg(long)]
    pub rcon_port: Option<u16>,
    #[arg(long, env = "SSM_RCON_PASSWORD", hide_env_values = true)]
    pub rcon_password: Option<String>,
    #[arg(long, default_value_t = DEFAULT_MAX_PLAYERS)]
    pub max_players: u32,
}

#[derive(ClapArgs, Debug)]
pub struct UpdateServer {
    pub id: u64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub query_port: Option<u16>,
    #[arg(long)]
    pub rcon_port: Option<u16>,
    #[arg(long, env = "SSM_RCON_PASSWORD", hide_env_values = true)]
    pub rcon_password: Option<String>,
    #[arg(long)]
    pub max_players: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Install,
    Runtime,
    Error,
}

impl From<LogStream> for LogKind {
    fn from(stream: LogStream) -> Self {
        match stream {
            LogStream::Install => LogKind::Install,
            LogStream::Runtime => LogKind::Runtime,
            LogStream::Error   => LogKind::Error,
        }
    }
}
