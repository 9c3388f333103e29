pub mod auth;
pub mod comments;
pub mod likes;
pub mod multipart_parsing;
pub mod subscriptions;
pub mod users;
pub mod videos;
