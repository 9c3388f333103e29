use diesel::dsl::{count_star, exists, select};
use diesel::pg::upsert::on_constraint;
use diesel::{BoolExpressionMethods, ExpressionMethods, PgConnection, QueryDsl};

use crate::diesel::RunQueryDsl;
use crate::errors::ApiError;
use crate::helpers::comments::ensure_comment_exists;
use crate::helpers::videos::ensure_video_exists;
use crate::models::{NewCommentLike, NewVideoLike, User};
use crate::schema::comment_likes::dsl::comment_likes;
use crate::schema::video_likes::dsl::video_likes;

/// Flips the (actor, video) like relation. Returns true when the video is
/// now liked. The delete-then-insert runs against the UNIQUE (user_id,
/// video_id) constraint: if a concurrent toggle wins the insert, ON CONFLICT
/// DO NOTHING swallows the duplicate and the outcome is still "liked" with a
/// single row.
pub fn toggle_video_like(db: &PgConnection, actor: &User, target_video_id: i32) -> Result<bool, ApiError> {
    ensure_video_exists(db, target_video_id)?;

    let deleted = diesel::delete(
        video_likes.filter(
            crate::schema::video_likes::user_id
                .eq(actor.id)
                .and(crate::schema::video_likes::video_id.eq(target_video_id)),
        ),
    )
    .execute(db)?;

    if deleted > 0 {
        return Ok(false);
    }

    let new_like = NewVideoLike {
        user_id: actor.id,
        video_id: target_video_id,
    };

    diesel::insert_into(video_likes)
        .values(&new_like)
        .on_conflict(on_constraint("video_likes_user_video_key"))
        .do_nothing()
        .execute(db)?;

    Ok(true)
}

pub fn toggle_comment_like(db: &PgConnection, actor: &User, target_comment_id: i32) -> Result<bool, ApiError> {
    ensure_comment_exists(db, target_comment_id)?;

    let deleted = diesel::delete(
        comment_likes.filter(
            crate::schema::comment_likes::user_id
                .eq(actor.id)
                .and(crate::schema::comment_likes::comment_id.eq(target_comment_id)),
        ),
    )
    .execute(db)?;

    if deleted > 0 {
        return Ok(false);
    }

    let new_like = NewCommentLike {
        user_id: actor.id,
        comment_id: target_comment_id,
    };

    diesel::insert_into(comment_likes)
        .values(&new_like)
        .on_conflict(on_constraint("comment_likes_user_comment_key"))
        .do_nothing()
        .execute(db)?;

    Ok(true)
}

pub fn video_like_count(db: &PgConnection, target_video_id: i32) -> Result<i64, ApiError> {
    ensure_video_exists(db, target_video_id)?;

    let count: i64 = video_likes
        .filter(crate::schema::video_likes::video_id.eq(target_video_id))
        .select(count_star())
        .first(db)?;

    Ok(count)
}

pub fn comment_like_count(db: &PgConnection, target_comment_id: i32) -> Result<i64, ApiError> {
    ensure_comment_exists(db, target_comment_id)?;

    let count: i64 = comment_likes
        .filter(crate::schema::comment_likes::comment_id.eq(target_comment_id))
        .select(count_star())
        .first(db)?;

    Ok(count)
}

pub fn has_liked_video(db: &PgConnection, actor: &User, target_video_id: i32) -> Result<bool, ApiError> {
    ensure_video_exists(db, target_video_id)?;

    let liked: bool = select(exists(
        video_likes.filter(
            crate::schema::video_likes::user_id
                .eq(actor.id)
                .and(crate::schema::video_likes::video_id.eq(target_video_id)),
        ),
    ))
    .get_result(db)?;

    Ok(liked)
}

pub fn has_liked_comment(db: &PgConnection, actor: &User, target_comment_id: i32) -> Result<bool, ApiError> {
    ensure_comment_exists(db, target_comment_id)?;

    let liked: bool = select(exists(
        comment_likes.filter(
            crate::schema::comment_likes::user_id
                .eq(actor.id)
                .and(crate::schema::comment_likes::comment_id.eq(target_comment_id)),
        ),
    ))
    .get_result(db)?;

    Ok(liked)
}
