table! {
    channels (id) {
        id -> Int4,
        name -> Varchar,
        description -> Varchar,
        user_id -> Int4,
    }
}

table! {
    comment_likes (id) {
        id -> Int4,
        user_id -> Int4,
        comment_id -> Int4,
        created_at -> Timestamp,
    }
}

table! {
    comments (id) {
        id -> Int4,
        content -> Varchar,
        created_at -> Timestamp,
        video_id -> Int4,
        user_id -> Int4,
        parent_id -> Nullable<Int4>,
    }
}

table! {
    subscriptions (id) {
        id -> Int4,
        subscriber_channel_id -> Int4,
        channel_id -> Int4,
        created_at -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Int4,
        email -> Varchar,
        password -> Varchar,
        created_at -> Timestamp,
    }
}

table! {
    video_likes (id) {
        id -> Int4,
        user_id -> Int4,
        video_id -> Int4,
        created_at -> Timestamp,
    }
}

table! {
    video_views (id) {
        id -> Int4,
        video_id -> Int4,
        user_id -> Nullable<Int4>,
        created_at -> Timestamp,
    }
}

table! {
    videos (id) {
        id -> Int4,
        title -> Varchar,
        description -> Nullable<Varchar>,
        category -> Nullable<Varchar>,
        video_data -> Bytea,
        thumbnail_data -> Nullable<Bytea>,
        created_at -> Timestamp,
        view_count -> Int8,
        channel_id -> Int4,
    }
}

joinable!(channels -> users (user_id));
joinable!(videos -> channels (channel_id));
joinable!(comments -> videos (video_id));
joinable!(comments -> users (user_id));
joinable!(comment_likes -> comments (comment_id));
joinable!(comment_likes -> users (user_id));
joinable!(video_likes -> videos (video_id));
joinable!(video_likes -> users (user_id));
joinable!(video_views -> videos (video_id));

allow_tables_to_appear_in_same_query!(
    channels,
    comment_likes,
    comments,
    subscriptions,
    users,
    video_likes,
    video_views,
    videos,
);
