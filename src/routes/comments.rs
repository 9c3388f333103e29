use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::errors::ApiError;
use crate::establish_connection;
use crate::helpers::auth::{resolve_actor, resolve_actor_optional};
use crate::helpers::comments::{add_comment, add_reply, delete_comment, replies, to_response, top_level_comments};
use crate::helpers::likes::{comment_like_count, has_liked_comment, toggle_comment_like};

#[derive(Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 1000))]
    content: String,
    parent_comment_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct VideoIdParams {
    video_id: i32,
}

#[derive(Deserialize)]
pub struct CommentIdParams {
    comment_id: i32,
}

// With a parent_comment_id in the body this creates a reply; the reply's
// video is taken from the parent, the path parameter is ignored for it.
#[post("/video/{video_id}")]
pub async fn create_comment(
    req: HttpRequest,
    params: web::Path<VideoIdParams>,
    data: web::Json<CommentRequest>,
) -> Result<HttpResponse, ApiError> {
    data.validate()?;

    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    let comment = match data.parent_comment_id {
        Some(parent_id) => add_reply(&db, parent_id, &data.content, &actor)?,
        None => add_comment(&db, params.video_id, &data.content, &actor)?,
    };

    let response = to_response(&db, &comment, Some(&actor))?;

    Ok(HttpResponse::Created().json(response))
}

#[get("/video/{video_id}")]
pub async fn get_comments(req: HttpRequest, params: web::Path<VideoIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let viewer = resolve_actor_optional(&req, &db)?;

    let comments = top_level_comments(&db, params.video_id)?;

    let mut responses = Vec::with_capacity(comments.len());
    for comment in &comments {
        responses.push(to_response(&db, comment, viewer.as_ref())?);
    }

    Ok(HttpResponse::Ok().json(responses))
}

#[get("/{comment_id}/replies")]
pub async fn get_replies(req: HttpRequest, params: web::Path<CommentIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let viewer = resolve_actor_optional(&req, &db)?;

    let listed = replies(&db, params.comment_id)?;

    let mut responses = Vec::with_capacity(listed.len());
    for reply in &listed {
        responses.push(to_response(&db, reply, viewer.as_ref())?);
    }

    Ok(HttpResponse::Ok().json(responses))
}

#[post("/{comment_id}/like")]
pub async fn toggle_like(req: HttpRequest, params: web::Path<CommentIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    let liked = toggle_comment_like(&db, &actor, params.comment_id)?;

    Ok(HttpResponse::Ok().json(liked))
}

#[get("/{comment_id}/like-count")]
pub async fn get_like_count(params: web::Path<CommentIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();

    let count = comment_like_count(&db, params.comment_id)?;

    Ok(HttpResponse::Ok().json(count))
}

#[get("/{comment_id}/user-liked")]
pub async fn get_user_liked(req: HttpRequest, params: web::Path<CommentIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    let liked = has_liked_comment(&db, &actor, params.comment_id)?;

    Ok(HttpResponse::Ok().json(liked))
}

#[delete("/{comment_id}")]
pub async fn remove_comment(req: HttpRequest, params: web::Path<CommentIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    delete_comment(&db, &actor, params.comment_id)?;

    Ok(HttpResponse::NoContent().finish())
}
