use actix_web::{get, post, web, HttpRequest, HttpResponse};
use diesel::PgConnection;
use serde::Deserialize;
use validator::Validate;

use crate::errors::ApiError;
use crate::establish_connection;
use crate::helpers::auth::{resolve_actor, resolve_actor_optional};
use crate::helpers::likes::{has_liked_video, toggle_video_like, video_like_count};
use crate::helpers::multipart_parsing::attempt_parse_multipart;
use crate::helpers::subscriptions::get_channel_by_id;
use crate::helpers::videos::{
    create_video, get_video, get_video_meta, page_params, paged_videos, record_view, thumbnail_content_type,
};
use crate::models::{ChannelInfo, User, VideoMeta, VideoPage, VideoResponse};

fn video_response(db: &PgConnection, meta: &VideoMeta, viewer: Option<&User>) -> Result<VideoResponse, ApiError> {
    let channel = get_channel_by_id(db, meta.channel_id)?;

    let like_count = video_like_count(db, meta.id)?;

    let viewer_has_liked = match viewer {
        Some(user) => has_liked_video(db, user, meta.id)?,
        None => false,
    };

    Ok(VideoResponse {
        id: meta.id,
        title: meta.title.clone(),
        description: meta.description.clone(),
        category: meta.category.clone(),
        created_at: meta.created_at,
        view_count: meta.view_count,
        like_count,
        viewer_has_liked,
        channel: ChannelInfo {
            id: channel.id,
            name: channel.name,
        },
    })
}

#[derive(Deserialize, Validate)]
pub struct UploadVideoData {
    #[validate(length(min = 1, max = 256))]
    title: String,
    description: Option<String>,
    category: Option<String>,
}

#[post("/")]
pub async fn upload_video(req: HttpRequest, payload: actix_multipart::Multipart) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    let parsed = attempt_parse_multipart::<UploadVideoData>(payload)
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let data = parsed
        .data
        .ok_or_else(|| ApiError::Validation(String::from("missing JSON metadata part")))?;
    data.validate()?;

    let video_file = parsed
        .files
        .get("video")
        .ok_or_else(|| ApiError::Validation(String::from("missing video file part")))?;

    let thumbnail = parsed.files.get("thumbnail");

    let meta = create_video(
        &db,
        &actor,
        &data.title,
        data.description.as_deref(),
        data.category.as_deref(),
        &video_file.data,
        thumbnail.map(|f| f.data.as_slice()),
    )?;

    log::info!(
        "user {} uploaded video {} ({} bytes)",
        actor.id,
        meta.id,
        video_file.data.len()
    );

    let response = video_response(&db, &meta, Some(&actor))?;

    Ok(HttpResponse::Created().json(response))
}

#[derive(Deserialize)]
pub struct PageQuery {
    page: Option<i64>,
    size: Option<i64>,
}

#[get("/")]
pub async fn get_videos(req: HttpRequest, query: web::Query<PageQuery>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let viewer = resolve_actor_optional(&req, &db)?;

    let (page, size) = page_params(query.page, query.size);
    let (items, total) = paged_videos(&db, page, size)?;

    let mut responses = Vec::with_capacity(items.len());
    for meta in &items {
        responses.push(video_response(&db, meta, viewer.as_ref())?);
    }

    Ok(HttpResponse::Ok().json(VideoPage {
        items: responses,
        page,
        size,
        total_elements: total,
        total_pages: (total + size - 1) / size,
    }))
}

#[derive(Deserialize)]
pub struct VideoIdParams {
    video_id: i32,
}

// Fetching a video counts as watching it: the view event (anonymous for
// guests) is recorded before the metadata is read back.
#[get("/{video_id}")]
pub async fn get_video_by_id(req: HttpRequest, params: web::Path<VideoIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let viewer = resolve_actor_optional(&req, &db)?;

    record_view(&db, params.video_id, viewer.as_ref())?;

    let meta = get_video_meta(&db, params.video_id)?;
    let response = video_response(&db, &meta, viewer.as_ref())?;

    Ok(HttpResponse::Ok().json(response))
}

#[get("/{video_id}/stream")]
pub async fn stream_video(params: web::Path<VideoIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();

    let video = get_video(&db, params.video_id)?;

    // Content type assumed, the upload path only accepts mp4/mpeg/mkv.
    Ok(HttpResponse::Ok().content_type("video/mp4").body(video.video_data))
}

#[get("/{video_id}/thumbnail")]
pub async fn get_thumbnail(params: web::Path<VideoIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();

    let video = get_video(&db, params.video_id)?;

    let thumbnail = video
        .thumbnail_data
        .ok_or_else(|| ApiError::NotFound(format!("video {} has no thumbnail", params.video_id)))?;

    Ok(HttpResponse::Ok()
        .content_type(thumbnail_content_type(&thumbnail))
        .body(thumbnail))
}

#[post("/{video_id}/like")]
pub async fn toggle_like(req: HttpRequest, params: web::Path<VideoIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    let liked = toggle_video_like(&db, &actor, params.video_id)?;

    Ok(HttpResponse::Ok().json(liked))
}

#[get("/{video_id}/like-count")]
pub async fn get_like_count(params: web::Path<VideoIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();

    let count = video_like_count(&db, params.video_id)?;

    Ok(HttpResponse::Ok().json(count))
}

#[get("/{video_id}/user-liked")]
pub async fn get_user_liked(req: HttpRequest, params: web::Path<VideoIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    let liked = has_liked_video(&db, &actor, params.video_id)?;

    Ok(HttpResponse::Ok().json(liked))
}
