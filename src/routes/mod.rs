pub mod auth;
pub mod channels;
pub mod comments;
pub mod videos;
