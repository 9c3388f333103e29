#[macro_use]
extern crate diesel;
extern crate dotenv;

use std::env;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use diesel::pg::PgConnection;
use diesel::prelude::*;

mod errors;
mod helpers;
mod models;
mod routes;
mod schema;
#[cfg(test)]
mod test_support;

pub fn establish_connection() -> PgConnection {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgConnection::establish(&database_url).expect(&format!("Error connecting to {}", database_url))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| String::from("127.0.0.1:5000"));

    log::info!("listening on {}", bind_addr);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/auth")
                    .service(routes::auth::register)
                    .service(routes::auth::login),
            )
            .service(
                web::scope("/videos")
                    .service(routes::videos::upload_video)
                    .service(routes::videos::get_videos)
                    .service(routes::videos::stream_video)
                    .service(routes::videos::get_thumbnail)
                    .service(routes::videos::toggle_like)
                    .service(routes::videos::get_like_count)
                    .service(routes::videos::get_user_liked)
                    .service(routes::videos::get_video_by_id),
            )
            .service(
                web::scope("/comments")
                    .service(routes::comments::create_comment)
                    .service(routes::comments::get_comments)
                    .service(routes::comments::get_replies)
                    .service(routes::comments::toggle_like)
                    .service(routes::comments::get_like_count)
                    .service(routes::comments::get_user_liked)
                    .service(routes::comments::remove_comment),
            )
            .service(
                web::scope("/channels")
                    .service(routes::channels::subscribe_to_channel)
                    .service(routes::channels::unsubscribe_from_channel)
                    .service(routes::channels::get_is_subscribed)
                    .service(routes::channels::get_subscriber_count),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
