use diesel::dsl::{exists, select};
use diesel::{BoolExpressionMethods, Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl};

use crate::diesel::RunQueryDsl;
use crate::errors::ApiError;
use crate::helpers::likes::{comment_like_count, has_liked_comment};
use crate::helpers::subscriptions::channel_for_user;
use crate::helpers::users::get_user_by_id;
use crate::helpers::videos::ensure_video_exists;
use crate::models::{ChannelInfo, Comment, CommentAuthor, CommentResponse, NewComment, User};
use crate::schema::comment_likes::dsl::comment_likes;
use crate::schema::comments::dsl::comments;

pub fn ensure_comment_exists(db: &PgConnection, target_comment_id: i32) -> Result<(), ApiError> {
    let found: bool = select(exists(
        comments.filter(crate::schema::comments::id.eq(target_comment_id)),
    ))
    .get_result(db)?;

    if !found {
        return Err(ApiError::NotFound(format!("comment {} not found", target_comment_id)));
    }

    Ok(())
}

pub fn get_comment(db: &PgConnection, target_comment_id: i32) -> Result<Comment, ApiError> {
    comments
        .find(target_comment_id)
        .first::<Comment>(db)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("comment {} not found", target_comment_id)))
}

pub fn add_comment(db: &PgConnection, target_video_id: i32, content: &str, author: &User) -> Result<Comment, ApiError> {
    ensure_video_exists(db, target_video_id)?;

    let new_comment = NewComment {
        content,
        video_id: target_video_id,
        user_id: author.id,
        parent_id: None,
    };

    let comment: Comment = diesel::insert_into(comments).values(&new_comment).get_result(db)?;

    Ok(comment)
}

/// The reply's video comes from the parent row, never from the caller.
pub fn add_reply(db: &PgConnection, parent_comment_id: i32, content: &str, author: &User) -> Result<Comment, ApiError> {
    let parent = get_comment(db, parent_comment_id)?;

    let new_reply = NewComment {
        content,
        video_id: parent.video_id,
        user_id: author.id,
        parent_id: Some(parent.id),
    };

    let reply: Comment = diesel::insert_into(comments).values(&new_reply).get_result(db)?;

    Ok(reply)
}

/// Top-level comments, newest first.
pub fn top_level_comments(db: &PgConnection, target_video_id: i32) -> Result<Vec<Comment>, ApiError> {
    ensure_video_exists(db, target_video_id)?;

    let result: Vec<Comment> = comments
        .filter(
            crate::schema::comments::video_id
                .eq(target_video_id)
                .and(crate::schema::comments::parent_id.is_null()),
        )
        .order(crate::schema::comments::created_at.desc())
        .load(db)?;

    Ok(result)
}

/// Replies, oldest first. The ordering is deliberately the opposite of
/// top_level_comments.
pub fn replies(db: &PgConnection, parent_comment_id: i32) -> Result<Vec<Comment>, ApiError> {
    ensure_comment_exists(db, parent_comment_id)?;

    let result: Vec<Comment> = comments
        .filter(crate::schema::comments::parent_id.eq(Some(parent_comment_id)))
        .order(crate::schema::comments::created_at.asc())
        .load(db)?;

    Ok(result)
}

/// Author-only delete. Descendants are collected level by level through
/// parent-id lookups, then likes and comment rows go in one transaction.
/// The ON DELETE CASCADE constraints back the same invariant at the
/// storage layer.
pub fn delete_comment(db: &PgConnection, actor: &User, target_comment_id: i32) -> Result<(), ApiError> {
    let comment = get_comment(db, target_comment_id)?;

    if comment.user_id != actor.id {
        return Err(ApiError::InvalidOperation(String::from(
            "only the author can delete a comment",
        )));
    }

    let mut doomed: Vec<i32> = vec![comment.id];
    let mut frontier: Vec<i32> = vec![comment.id];

    while !frontier.is_empty() {
        let parents: Vec<Option<i32>> = frontier.iter().map(|v| Some(*v)).collect();

        frontier = comments
            .filter(crate::schema::comments::parent_id.eq_any(parents))
            .select(crate::schema::comments::id)
            .load::<i32>(db)?;

        doomed.extend(&frontier);
    }

    db.transaction::<(), ApiError, _>(|| {
        diesel::delete(comment_likes.filter(crate::schema::comment_likes::comment_id.eq_any(&doomed)))
            .execute(db)?;

        diesel::delete(comments.filter(crate::schema::comments::id.eq_any(&doomed))).execute(db)?;

        Ok(())
    })
}

/// Shapes a comment row for the API: author + channel info joined in,
/// like count and the viewer's flag derived from the like table.
pub fn to_response(db: &PgConnection, comment: &Comment, viewer: Option<&User>) -> Result<CommentResponse, ApiError> {
    let author = get_user_by_id(db, comment.user_id)?;

    let channel = channel_for_user(db, author.id)
        .ok()
        .map(|c| ChannelInfo { id: c.id, name: c.name });

    let like_count = comment_like_count(db, comment.id)?;

    let viewer_has_liked = match viewer {
        Some(user) => has_liked_comment(db, user, comment.id)?,
        None => false,
    };

    Ok(CommentResponse {
        id: comment.id,
        content: comment.content.clone(),
        created_at: comment.created_at,
        parent_comment_id: comment.parent_id,
        user: CommentAuthor {
            id: author.id,
            email: author.email,
            channel,
        },
        like_count,
        viewer_has_liked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connect, create_user, create_video};

    #[test]
    #[ignore] // needs a migrated postgres at TEST_DATABASE_URL / DATABASE_URL
    fn listing_order_is_asymmetric() {
        let db = connect();
        let (user, channel) = create_user(&db);
        let video = create_video(&db, channel.id);

        let first = add_comment(&db, video.id, "first", &user).unwrap();
        let second = add_comment(&db, video.id, "second", &user).unwrap();

        let top = top_level_comments(&db, video.id).unwrap();
        let positions: Vec<i32> = top.iter().map(|c| c.id).collect();
        // newest first
        assert!(positions.iter().position(|&i| i == second.id) < positions.iter().position(|&i| i == first.id));
        for pair in top.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }

        let early_reply = add_reply(&db, first.id, "early", &user).unwrap();
        let late_reply = add_reply(&db, first.id, "late", &user).unwrap();

        let listed = replies(&db, first.id).unwrap();
        assert_eq!(listed[0].id, early_reply.id);
        assert_eq!(listed[1].id, late_reply.id);
        for pair in listed.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    #[ignore]
    fn reply_inherits_video_from_parent() {
        let db = connect();
        let (user, channel) = create_user(&db);
        let video = create_video(&db, channel.id);

        let parent = add_comment(&db, video.id, "parent", &user).unwrap();
        let reply = add_reply(&db, parent.id, "reply", &user).unwrap();

        assert_eq!(reply.video_id, parent.video_id);
        assert_eq!(reply.parent_id, Some(parent.id));
    }

    #[test]
    #[ignore]
    fn deleting_a_comment_removes_descendants_and_their_likes() {
        let db = connect();
        let (user, channel) = create_user(&db);
        let video = create_video(&db, channel.id);

        let parent = add_comment(&db, video.id, "parent", &user).unwrap();
        let reply = add_reply(&db, parent.id, "reply", &user).unwrap();
        let nested = add_reply(&db, reply.id, "nested", &user).unwrap();

        crate::helpers::likes::toggle_comment_like(&db, &user, nested.id).unwrap();

        delete_comment(&db, &user, parent.id).unwrap();

        for doomed in [parent.id, reply.id, nested.id].iter() {
            match get_comment(&db, *doomed) {
                Err(ApiError::NotFound(_)) => (),
                other => panic!("comment {} survived: {:?}", doomed, other.err()),
            }
        }
    }

    #[test]
    #[ignore]
    fn only_the_author_can_delete() {
        let db = connect();
        let (author, channel) = create_user(&db);
        let (stranger, _) = create_user(&db);
        let video = create_video(&db, channel.id);

        let comment = add_comment(&db, video.id, "mine", &author).unwrap();

        match delete_comment(&db, &stranger, comment.id) {
            Err(ApiError::InvalidOperation(_)) => (),
            other => panic!("expected InvalidOperation, got {:?}", other.err()),
        }
    }
}
