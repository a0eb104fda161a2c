mod comments;
mod moderators;
mod notifications;
mod posts;
mod topics;
mod users;
mod votes;
