use std::time::SystemTime;

use serde::Serialize;

use crate::schema::channels;
use crate::schema::comment_likes;
use crate::schema::comments;
use crate::schema::subscriptions;
use crate::schema::users;
use crate::schema::video_likes;
use crate::schema::video_views;
use crate::schema::videos;
use crate::schema::videos::columns::{category, channel_id, created_at, description, id, title, view_count};

#[derive(Queryable)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub created_at: SystemTime,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Queryable, Serialize)]
pub struct Channel {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub user_id: i32,
}

#[derive(Insertable)]
#[table_name = "channels"]
pub struct NewChannel<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub user_id: i32,
}

// Full row including the raw bytes. Listing queries go through VideoMeta
// instead so a page of results never drags the blobs out of the database.
#[derive(Queryable)]
pub struct Video {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub video_data: Vec<u8>,
    pub thumbnail_data: Option<Vec<u8>>,
    pub created_at: SystemTime,
    pub view_count: i64,
    pub channel_id: i32,
}

#[derive(Queryable)]
pub struct VideoMeta {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: SystemTime,
    pub view_count: i64,
    pub channel_id: i32,
}

pub fn video_meta_fields() -> (id, title, description, category, created_at, view_count, channel_id) {
    (
        crate::schema::videos::id,
        crate::schema::videos::title,
        crate::schema::videos::description,
        crate::schema::videos::category,
        crate::schema::videos::created_at,
        crate::schema::videos::view_count,
        crate::schema::videos::channel_id,
    )
}

#[derive(Insertable)]
#[table_name = "videos"]
pub struct NewVideo<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub video_data: &'a [u8],
    pub thumbnail_data: Option<&'a [u8]>,
    pub channel_id: i32,
}

#[derive(Queryable)]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub created_at: SystemTime,
    pub video_id: i32,
    pub user_id: i32,
    pub parent_id: Option<i32>,
}

#[derive(Insertable)]
#[table_name = "comments"]
pub struct NewComment<'a> {
    pub content: &'a str,
    pub video_id: i32,
    pub user_id: i32,
    pub parent_id: Option<i32>,
}

#[derive(Queryable)]
pub struct VideoLike {
    pub id: i32,
    pub user_id: i32,
    pub video_id: i32,
    pub created_at: SystemTime,
}

#[derive(Insertable)]
#[table_name = "video_likes"]
pub struct NewVideoLike {
    pub user_id: i32,
    pub video_id: i32,
}

#[derive(Queryable)]
pub struct CommentLike {
    pub id: i32,
    pub user_id: i32,
    pub comment_id: i32,
    pub created_at: SystemTime,
}

#[derive(Insertable)]
#[table_name = "comment_likes"]
pub struct NewCommentLike {
    pub user_id: i32,
    pub comment_id: i32,
}

#[derive(Queryable)]
pub struct Subscription {
    pub id: i32,
    pub subscriber_channel_id: i32,
    pub channel_id: i32,
    pub created_at: SystemTime,
}

#[derive(Insertable)]
#[table_name = "subscriptions"]
pub struct NewSubscription {
    pub subscriber_channel_id: i32,
    pub channel_id: i32,
}

#[derive(Queryable)]
pub struct VideoView {
    pub id: i32,
    pub video_id: i32,
    pub user_id: Option<i32>,
    pub created_at: SystemTime,
}

#[derive(Insertable)]
#[table_name = "video_views"]
pub struct NewVideoView {
    pub video_id: i32,
    pub user_id: Option<i32>,
}

// Response shapes. Like counts and per-viewer flags are derived at
// assembly time from the like tables, never stored on the row.

#[derive(Serialize)]
pub struct ChannelInfo {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub created_at: SystemTime,
    pub channel: Channel,
}

#[derive(Serialize)]
pub struct VideoResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: SystemTime,
    pub view_count: i64,
    pub like_count: i64,
    pub viewer_has_liked: bool,
    pub channel: ChannelInfo,
}

#[derive(Serialize)]
pub struct CommentAuthor {
    pub id: i32,
    pub email: String,
    pub channel: Option<ChannelInfo>,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub id: i32,
    pub content: String,
    pub created_at: SystemTime,
    pub parent_comment_id: Option<i32>,
    pub user: CommentAuthor,
    pub like_count: i64,
    pub viewer_has_liked: bool,
}

#[derive(Serialize)]
pub struct VideoPage {
    pub items: Vec<VideoResponse>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}
