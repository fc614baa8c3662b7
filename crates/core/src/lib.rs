pub mod error;
pub mod format;
pub mod role;
pub mod state;
pub mod window;

pub use error::{Result, SsmError};
pub use role::Role;
pub use state::{
    GitStatus, InviteToken, MetricSample, Notification, NotificationKind, ServerSummary, Session,
    SystemHistory, SystemInfo, User,
};
pub use window::RollingWindow;
