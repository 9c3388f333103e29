use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::errors::ApiError;
use crate::establish_connection;
use crate::helpers::subscriptions::channel_for_user;
use crate::helpers::users::{authenticate, register_user};
use crate::models::{Channel, User, UserResponse};

fn user_response(user: User, channel: Channel) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
        channel,
    }
}

#[derive(Deserialize, Validate)]
pub struct RegisterInfo {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

#[post("/register")]
pub async fn register(data: web::Json<RegisterInfo>) -> Result<HttpResponse, ApiError> {
    data.validate()?;

    let db = establish_connection();

    let (user, channel) = register_user(&db, &data.email, &data.password)?;

    log::info!("registered user {} with channel '{}'", user.id, channel.name);

    Ok(HttpResponse::Created().json(user_response(user, channel)))
}

#[derive(Deserialize, Validate)]
pub struct LoginInfo {
    #[validate(email)]
    email: String,
    password: String,
}

// Login only validates credentials and echoes the profile back; subsequent
// requests carry the same credentials in headers.
#[post("/login")]
pub async fn login(data: web::Json<LoginInfo>) -> Result<HttpResponse, ApiError> {
    data.validate()?;

    let db = establish_connection();

    let user = authenticate(&db, &data.email, &data.password)?;
    let channel = channel_for_user(&db, user.id)?;

    Ok(HttpResponse::Ok().json(user_response(user, channel)))
}
