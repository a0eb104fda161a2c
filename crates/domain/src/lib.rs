mod capability;
mod commands;
mod error;
mod events;
mod models;
mod notification;
pub mod thread;

pub use capability::{Capabilities, Capability};
pub use commands::FanoutRequest;
pub use error::{ErrorKind, ForumError, Result};
pub use events::ThreadEvent;
pub use models::*;
pub use notification::{Notification, NotificationContent, NotificationKind};
