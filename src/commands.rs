//! Subcommand implementations.

use crate::cli::{Args, Command, NotificationCommand, ServerCommand, TokenCommand};
use crate::render;
use anyhow::{Context as _, Result};
use ssm_api::{ApiClient, NewServer, NotificationCenter, ServerAction, ServerUpdate};
use ssm_config::SsmConfig;
use ssm_core::SsmError;
use ssm_poller::{DashboardState, MetricsPoller, PollHandle, UnreadCounter, UnreadState};
use ssm_session::{AuthSession, FileStore};
use tokio::sync::watch;
use tracing::{info, warn};

/// Everything a subcommand may need, built once per invocation.
pub struct Context {
    pub config: SsmConfig,
    pub client: ApiClient,
    pub auth:   AuthSession<FileStore>,
}

impl Context {
    pub fn from_args(args: &Args) -> Result<Self> {
        let path = args.config.clone().unwrap_or_else(ssm_config::default_path);
        let mut config = ssm_config::load(&path)?;
        if let Some(url) = &args.api_url {
            config.api.base_url = url.clone();
        }
        config.validate()?;

        let auth = AuthSession::init(FileStore::new(ssm_config::session_path(&config)));
        let mut client = ApiClient::new(&config.api)?;
        client.set_token(auth.token().map(str::to_owned));

        Ok(Self { config, client, auth })
    }
}

pub async fn run(args: Args) -> Result<()> {
    let mut ctx = Context::from_args(&args)?;
    let result = dispatch(&mut ctx, args.command).await;

    // A rejected token is dead: forget it so the next command starts clean.
    if let Err(e) = &result {
        if e.downcast_ref::<SsmError>().is_some_and(SsmError::is_unauthorized) && ctx.auth.is_authenticated() {
            warn!("Backend rejected the stored session; clearing it");
            ctx.auth.logout()?;
        }
    }
    result
}

async fn dispatch(ctx: &mut Context, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let session = ctx.client.login(&email, &password).await?;
            println!("Logged in as {}", render::user_line(&session.user));
            ctx.auth.login(session)?;
        }
        Command::Logout => {
            if ctx.auth.is_authenticated() {
                if let Err(e) = ctx.client.logout().await {
                    warn!("Server-side logout failed: {e}");
                }
            }
            ctx.auth.logout()?;
            println!("Logged out");
        }
        Command::Whoami => {
            let user = ctx.client.me().await?;
            println!("{}", render::user_line(&user));
            ctx.auth.update_user(user)?;
        }
        Command::Watch { once } => watch(ctx, once).await?,
        Command::History => {
            let history = ctx.client.system_history().await?;
            println!("{}", render::history_summary(&history));
        }
        Command::GitStatus => {
            let status = ctx.client.git_status().await?;
            if status.updates_available {
                println!("Update available: {} commit(s) behind", status.commits_behind);
            } else {
                println!("Up to date");
            }
        }
        Command::GitUpdate => {
            let ack = ctx.client.git_update().await?;
            println!("Update started: {}", ack.message);
        }
        Command::Tokens(cmd) => tokens(ctx, cmd).await?,
        Command::Notifications(cmd) => notifications(ctx, cmd).await?,
        Command::Servers(cmd) => servers(ctx, cmd).await?,
    }
    Ok(())
}

async fn watch(ctx: &Context, once: bool) -> Result<()> {
    info!("Watching {}", ctx.client.base_url());
    let mut poller = MetricsPoller::new(ctx.client.clone(), &ctx.config.poller).start();
    let mut updates = poller.subscribe();

    let unread = ctx
        .auth
        .is_authenticated()
        .then(|| UnreadCounter::new(ctx.client.clone(), &ctx.config.poller).start());
    let mut badge = unread.as_ref().map(PollHandle::subscribe);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut gate = TickGate::default();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                changed.context("poller stopped unexpectedly")?;
                let state = updates.borrow_and_update().clone();
                if !gate.is_new_tick(&state) {
                    continue;
                }
                let count = badge.as_ref().and_then(|rx| rx.borrow().count);
                println!("{}", render::live_line(&state, count));
                if once {
                    break;
                }
            }
            () = session_rejected(badge.as_mut()) => {
                poller.stop();
                return Err(SsmError::Unauthorized("session expired".into()).into());
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

/// Lets one line through per completed fast tick that has a sample to show.
/// History refreshes also wake the receiver; they are filtered out here.
#[derive(Debug, Default)]
struct TickGate {
    seen: u64,
}

impl TickGate {
    fn is_new_tick(&mut self, state: &DashboardState) -> bool {
        let ticks = state.fast_ticks();
        if ticks == self.seen || state.latest_sample().is_none() {
            return false;
        }
        self.seen = ticks;
        true
    }
}

/// Resolves once the badge loop reports a refused token. Never resolves
/// without a badge loop.
async fn session_rejected(badge: Option<&mut watch::Receiver<UnreadState>>) {
    if let Some(rx) = badge {
        if rx.wait_for(|s| s.rejected).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}

async fn tokens(ctx: &mut Context, cmd: TokenCommand) -> Result<()> {
    match cmd {
        TokenCommand::List => {
            let tokens = ctx.client.my_tokens().await?;
            if tokens.is_empty() {
                println!("No tokens");
            }
            for t in &tokens {
                println!("{}", render::token_line(t));
            }
        }
        TokenCommand::Activate { code } => {
            let activation = ctx.client.activate_token(&code).await?;
            ctx.auth.update_role(activation.role)?;
            println!(
                "Token activated: you are now {} (until {})",
                activation.role, activation.expires_at
            );
        }
        TokenCommand::Generate { email, days } => {
            let caller = ctx
                .auth
                .role()
                .ok_or_else(|| SsmError::Unauthorized("not logged in".into()))?;
            let minted = ctx.client.generate_token(caller, &email, days).await?;
            println!("Token for {email}: {} (expires {})", minted.token_code, minted.expires_at);
        }
    }
    Ok(())
}

async fn notifications(ctx: &Context, cmd: NotificationCommand) -> Result<()> {
    match cmd {
        NotificationCommand::List => {
            let mut center = NotificationCenter::default();
            center.refresh(&ctx.client).await?;
            if center.items.is_empty() {
                println!("No notifications");
            }
            let now = chrono::Utc::now();
            for n in &center.items {
                println!("{}", render::notification_line(n, now));
            }
        }
        NotificationCommand::Count => {
            println!("{}", ctx.client.unread_count().await?);
        }
        NotificationCommand::Read { id } => {
            ctx.client.mark_notification_read(&id).await?;
            println!("Marked {id} as read");
        }
    }
    Ok(())
}

async fn servers(ctx: &Context, cmd: ServerCommand) -> Result<()> {
    let (id, action) = match cmd {
        ServerCommand::List => {
            for s in ctx.client.servers().await? {
                println!("{}", render::server_line(&s));
            }
            return Ok(());
        }
        ServerCommand::Show(s) => {
            println!("{}", render::server_line(&ctx.client.server(s.id).await?));
            return Ok(());
        }
        ServerCommand::Create(new) => {
            let server = NewServer {
                query_port: new.query_port,
                rcon_port: new.rcon_port,
                rcon_password: new.rcon_password,
                max_players: new.max_players,
                ..NewServer::new(new.name, new.game_type, new.port)
            };
            let created = ctx.client.create_server(&server).await?;
            println!("Created {}", render::server_line(&created));
            return Ok(());
        }
        ServerCommand::Update(edit) => {
            let update = ServerUpdate {
                name: edit.name,
                port: edit.port,
                query_port: edit.query_port,
                rcon_port: edit.rcon_port,
                rcon_password: edit.rcon_password,
                max_players: edit.max_players,
            };
            let updated = ctx.client.update_server(edit.id, &update).await?;
            println!("Updated {}", render::server_line(&updated));
            return Ok(());
        }
        ServerCommand::Delete(s) => {
            let ack = ctx.client.delete_server(s.id).await?;
            println!("#{}: {}", s.id, ack.message);
            return Ok(());
        }
        ServerCommand::Status(s) => {
            let status = ctx.client.server_status(s.id).await?;
            println!("{}", render::server_status_line(s.id, &status));
            return Ok(());
        }
        ServerCommand::Logs { id, kind, limit } => {
            for entry in ctx.client.server_logs(id, kind.into(), limit).await? {
                println!("{}", render::log_line(&entry));
            }
            return Ok(());
        }
        ServerCommand::Start(s)   => (s.id, ServerAction::Start),
        ServerCommand::Stop(s)    => (s.id, ServerAction::Stop),
        ServerCommand::Install(s) => (s.id, ServerAction::Install),
    };
    let ack = ctx.client.server_action(id, action).await?;
    println!("{action} #{id}: {}", ack.message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssm_core::state::{CpuInfo, NetworkCounters};
    use ssm_core::{SystemHistory, SystemInfo};
    use std::time::Duration;
    use tokio::time::Instant;

    fn info(cpu: f64) -> SystemInfo {
        SystemInfo {
            cpu: CpuInfo { percent: cpu, ..Default::default() },
            network: NetworkCounters::default(),
            ..Default::default()
        }
    }

    #[test]
    fn history_refresh_prints_nothing() {
        let mut gate = TickGate::default();
        let mut state = DashboardState::default();
        assert!(!gate.is_new_tick(&state));

        state.on_fast_tick(info(10.0), Instant::now(), "a".into());
        assert!(gate.is_new_tick(&state));

        state.on_slow_tick(SystemHistory::default());
        assert!(!gate.is_new_tick(&state));
        state.record_slow_failure();
        assert!(!gate.is_new_tick(&state));

        state.on_fast_tick(info(20.0), Instant::now(), "b".into());
        assert!(gate.is_new_tick(&state));
    }

    #[test]
    fn failures_before_first_sample_print_nothing() {
        let mut gate = TickGate::default();
        let mut state = DashboardState::default();
        state.record_fast_failure();
        assert!(!gate.is_new_tick(&state));

        // Later failures still reprint the last sample with the failure count.
        state.on_fast_tick(info(10.0), Instant::now(), "a".into());
        assert!(gate.is_new_tick(&state));
        state.record_fast_failure();
        assert!(gate.is_new_tick(&state));
    }

    #[tokio::test]
    async fn rejected_badge_ends_the_wait() {
        let (tx, mut rx) = watch::channel(UnreadState::default());
        tokio::spawn(async move {
            tx.send_modify(|s| s.count = Some(2));
            tx.send_modify(|s| s.rejected = true);
            // Keep the sender alive past the rejection.
            tokio::time::sleep(Duration::from_secs(1)).await;
        });
        tokio::time::timeout(Duration::from_secs(1), session_rejected(Some(&mut rx)))
            .await
            .expect("rejection should end the wait");
    }

    #[tokio::test]
    async fn no_badge_loop_never_rejects() {
        let waited = tokio::time::timeout(Duration::from_millis(50), session_rejected(None)).await;
        assert!(waited.is_err());
    }
}
