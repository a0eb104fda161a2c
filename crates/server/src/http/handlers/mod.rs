pub mod comments;
pub mod moderation;
pub mod notifications;
pub mod sse;
