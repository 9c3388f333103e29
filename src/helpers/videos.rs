use diesel::dsl::{exists, select};
use diesel::{Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl};

use crate::diesel::RunQueryDsl;
use crate::errors::ApiError;
use crate::helpers::subscriptions::channel_for_user;
use crate::models::{video_meta_fields, NewVideo, NewVideoView, User, Video, VideoMeta};
use crate::schema::video_views::dsl::video_views;
use crate::schema::videos::dsl::videos;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
// Keeps page * size inside i64 for any clamped size.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

pub fn ensure_video_exists(db: &PgConnection, target_video_id: i32) -> Result<(), ApiError> {
    let found: bool = select(exists(
        videos.filter(crate::schema::videos::id.eq(target_video_id)),
    ))
    .get_result(db)?;

    if !found {
        return Err(ApiError::NotFound(format!("video {} not found", target_video_id)));
    }

    Ok(())
}

/// Full row, raw bytes included. Only the stream and thumbnail endpoints
/// should need this; everything else reads the meta projection.
pub fn get_video(db: &PgConnection, target_video_id: i32) -> Result<Video, ApiError> {
    videos
        .find(target_video_id)
        .first::<Video>(db)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("video {} not found", target_video_id)))
}

pub fn get_video_meta(db: &PgConnection, target_video_id: i32) -> Result<VideoMeta, ApiError> {
    videos
        .find(target_video_id)
        .select(video_meta_fields())
        .first::<VideoMeta>(db)
        .optional()?
        .ok_or_else(|| ApiError::NotFound(format!("video {} not found", target_video_id)))
}

pub fn create_video(
    db: &PgConnection,
    uploader: &User,
    title: &str,
    description: Option<&str>,
    category: Option<&str>,
    video_bytes: &[u8],
    thumbnail_bytes: Option<&[u8]>,
) -> Result<VideoMeta, ApiError> {
    let channel = channel_for_user(db, uploader.id)?;

    let new_video = NewVideo {
        title,
        description,
        category,
        video_data: video_bytes,
        thumbnail_data: thumbnail_bytes,
        channel_id: channel.id,
    };

    let meta: VideoMeta = diesel::insert_into(videos)
        .values(&new_video)
        .returning(video_meta_fields())
        .get_result(db)?;

    Ok(meta)
}

/// Newest first, 0-indexed pages. Returns the page plus the total row count
/// for page metadata.
pub fn paged_videos(db: &PgConnection, page: i64, size: i64) -> Result<(Vec<VideoMeta>, i64), ApiError> {
    let total: i64 = videos.count().get_result(db)?;

    let items: Vec<VideoMeta> = videos
        .select(video_meta_fields())
        .order(crate::schema::videos::created_at.desc())
        .limit(size)
        .offset(page.saturating_mul(size))
        .load(db)?;

    Ok((items, total))
}

/// Thumbnails are stored without their upload mime, so the content type is
/// recovered from the magic bytes. The upload path only accepts png and jpeg.
pub fn thumbnail_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Clamps raw query parameters to sane paging bounds.
pub fn page_params(page: Option<i64>, size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(0).max(0).min(MAX_PAGE);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE).max(1).min(MAX_PAGE_SIZE);
    (page, size)
}

/// Appends a view event (viewer is None for guests) and bumps the cached
/// counter in the same transaction, so the counter tracks the event count.
pub fn record_view(db: &PgConnection, target_video_id: i32, viewer: Option<&User>) -> Result<(), ApiError> {
    ensure_video_exists(db, target_video_id)?;

    let new_view = NewVideoView {
        video_id: target_video_id,
        user_id: viewer.map(|u| u.id),
    };

    db.transaction::<(), ApiError, _>(|| {
        diesel::insert_into(video_views).values(&new_view).execute(db)?;

        diesel::update(videos.find(target_video_id))
            .set(crate::schema::videos::view_count.eq(crate::schema::videos::view_count + 1))
            .execute(db)?;

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connect, create_user, create_video};
    use diesel::dsl::count_star;

    #[test]
    fn page_params_defaults() {
        assert_eq!(page_params(None, None), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn page_params_clamps_out_of_range_values() {
        assert_eq!(page_params(Some(-3), Some(0)), (0, 1));
        assert_eq!(page_params(Some(2), Some(1000)), (2, MAX_PAGE_SIZE));
    }

    #[test]
    fn thumbnail_content_type_follows_magic_bytes() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(thumbnail_content_type(&png), "image/png");

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(thumbnail_content_type(&jpeg), "image/jpeg");
    }

    #[test]
    fn huge_page_number_cannot_overflow_the_offset() {
        let (page, size) = page_params(Some(i64::MAX), None);
        assert!(page.checked_mul(size).is_some());

        let (page, size) = page_params(Some(i64::MAX), Some(MAX_PAGE_SIZE));
        assert!(page.checked_mul(size).is_some());
    }

    #[test]
    #[ignore] // needs a migrated postgres at TEST_DATABASE_URL / DATABASE_URL
    fn views_count_named_and_anonymous_viewers_alike() {
        let db = connect();
        let (_, channel) = create_user(&db);
        let video = create_video(&db, channel.id);

        for _ in 0..3 {
            let (viewer, _) = create_user(&db);
            record_view(&db, video.id, Some(&viewer)).unwrap();
        }
        for _ in 0..2 {
            record_view(&db, video.id, None).unwrap();
        }

        let meta = get_video_meta(&db, video.id).unwrap();
        assert_eq!(meta.view_count, 5);

        let events: i64 = video_views
            .filter(crate::schema::video_views::video_id.eq(video.id))
            .select(count_star())
            .first(&db)
            .unwrap();
        assert_eq!(events, 5);
    }

    #[test]
    #[ignore]
    fn view_on_missing_video_is_not_found() {
        let db = connect();
        match record_view(&db, -1, None) {
            Err(ApiError::NotFound(_)) => (),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }
}
