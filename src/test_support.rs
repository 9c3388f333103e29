use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use diesel::{Connection, PgConnection};

use crate::diesel::RunQueryDsl;
use crate::helpers::users::register_user;
use crate::models::{video_meta_fields, Channel, NewVideo, User, VideoMeta};
use crate::schema::videos::dsl::videos;

/// Connection for DB-backed tests. Point TEST_DATABASE_URL (or
/// DATABASE_URL) at a postgres with the migrations applied.
pub fn connect() -> PgConnection {
    let url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .expect("TEST_DATABASE_URL or DATABASE_URL must be set");

    PgConnection::establish(&url).expect("failed to connect to test database")
}

pub fn unique_suffix() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("{}-{}", nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}

pub fn create_user(db: &PgConnection) -> (User, Channel) {
    let email = format!("user-{}@test.invalid", unique_suffix());
    register_user(db, &email, "hunter2").expect("failed to create test user")
}

pub fn create_video(db: &PgConnection, owner_channel_id: i32) -> VideoMeta {
    let title = format!("video-{}", unique_suffix());

    let new_video = NewVideo {
        title: &title,
        description: None,
        category: None,
        video_data: &[0u8; 16],
        thumbnail_data: None,
        channel_id: owner_channel_id,
    };

    diesel::insert_into(videos)
        .values(&new_video)
        .returning(video_meta_fields())
        .get_result(db)
        .expect("failed to create test video")
}
