use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::establish_connection;
use crate::helpers::auth::resolve_actor;
use crate::helpers::subscriptions::{is_subscribed, subscribe, subscriber_count, unsubscribe};

#[derive(Deserialize)]
pub struct ChannelIdParams {
    channel_id: i32,
}

#[post("/{channel_id}/subscribe")]
pub async fn subscribe_to_channel(req: HttpRequest, params: web::Path<ChannelIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    subscribe(&db, &actor, params.channel_id)?;

    Ok(HttpResponse::Ok().finish())
}

#[delete("/{channel_id}/unsubscribe")]
pub async fn unsubscribe_from_channel(req: HttpRequest, params: web::Path<ChannelIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    unsubscribe(&db, &actor, params.channel_id)?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/{channel_id}/is-subscribed")]
pub async fn get_is_subscribed(req: HttpRequest, params: web::Path<ChannelIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();
    let actor = resolve_actor(&req, &db)?;

    let subscribed = is_subscribed(&db, &actor, params.channel_id)?;

    Ok(HttpResponse::Ok().json(subscribed))
}

#[get("/{channel_id}/subscriber-count")]
pub async fn get_subscriber_count(params: web::Path<ChannelIdParams>) -> Result<HttpResponse, ApiError> {
    let db = establish_connection();

    let count = subscriber_count(&db, params.channel_id)?;

    Ok(HttpResponse::Ok().json(count))
}
