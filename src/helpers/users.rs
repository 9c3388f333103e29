use bcrypt::{hash, verify};
use diesel::dsl::{exists, select};
use diesel::{Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl};

use crate::diesel::RunQueryDsl;
use crate::errors::ApiError;
use crate::models::{Channel, NewChannel, NewUser, User};
use crate::schema::channels::dsl::{channels, name};
use crate::schema::users::dsl::{email, users};

const BCRYPT_COST: u32 = 4;

pub fn get_user_by_id(db: &PgConnection, target_user_id: i32) -> Result<User, ApiError> {
    users
        .find(target_user_id)
        .first::<User>(db)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", target_user_id)))
}

/// Registers a user and auto-creates their channel in one transaction, so a
/// user row never exists without its channel.
pub fn register_user(db: &PgConnection, user_email: &str, password: &str) -> Result<(User, Channel), ApiError> {
    let taken: bool = select(exists(users.filter(email.eq(user_email)))).get_result(db)?;

    if taken {
        return Err(ApiError::Conflict(format!("user with email {} already exists", user_email)));
    }

    let hashed = hash(password, BCRYPT_COST)?;

    db.transaction::<(User, Channel), ApiError, _>(|| {
        let new_user = NewUser {
            email: user_email,
            password: &hashed,
        };

        let user: User = diesel::insert_into(users).values(&new_user).get_result(db)?;

        let channel_name = unique_channel_name(user_email, |candidate| {
            let hit: bool = select(exists(channels.filter(name.eq(candidate)))).get_result(db)?;
            Ok(hit)
        })?;

        let channel_description = format!("Default channel for {}", user_email);

        let new_channel = NewChannel {
            name: &channel_name,
            description: &channel_description,
            user_id: user.id,
        };

        let channel: Channel = diesel::insert_into(channels).values(&new_channel).get_result(db)?;

        Ok((user, channel))
    })
}

pub fn authenticate(db: &PgConnection, user_email: &str, password: &str) -> Result<User, ApiError> {
    let user = users
        .filter(email.eq(user_email))
        .first::<User>(db)
        .optional()?
        .ok_or(ApiError::Unauthenticated)?;

    let valid = verify(password, &user.password).unwrap_or(false);

    if !valid {
        return Err(ApiError::Unauthenticated);
    }

    Ok(user)
}

/// Channel names derive from the email's local part; collisions get a
/// numbered suffix (`alice-channel`, `alice-channel-1`, ...).
pub fn unique_channel_name<F>(user_email: &str, mut is_taken: F) -> Result<String, ApiError>
where
    F: FnMut(&str) -> Result<bool, ApiError>,
{
    let base = user_email.split('@').next().unwrap_or("");
    let mut candidate = format!("{}-channel", base);
    let mut counter = 1;

    while is_taken(&candidate)? {
        candidate = format!("{}-channel-{}", base, counter);
        counter += 1;
    }

    Ok(candidate)
}
