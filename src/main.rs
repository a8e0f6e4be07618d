#[macro_use]
extern crate lazy_static;

use std::{env, str::FromStr};

use actix_files::{Files, NamedFile};
use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    cookie::Key,
    http::{Method, StatusCode},
    middleware,
    web::{self, Data},
    App, Either, HttpResponse, HttpServer, Responder,
};
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    SqlitePool,
};
use tera::Tera;

mod db;
mod errors;
mod forms;
mod routes;
mod stock;
mod structs;
mod utils;

#[derive(Debug, Clone)]
pub struct AppState {
    db_pool: SqlitePool,
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera
    };
}

fn get_session_key() -> Key {
    let key_str = env::var("SESSION_KEY").unwrap_or_else(|_| {
        log::error!("FATAL: SESSION_KEY environment variable not set");
        std::process::exit(1);
    });
    Key::from(key_str.as_bytes())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://speisekammer.db".to_owned());

    let opts = SqliteConnectOptions::from_str(&database_url)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(5));

    let db_pool = SqlitePool::connect_with(opts)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    sqlx::migrate!().run(&db_pool).await.expect("Migrate Error");

    info!("Database migrated successfully");

    info!("Starting HTTP server on http://localhost:8080/");

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                get_session_key(),
            ))
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .service(routes::favicon_handler)
            .service(routes::views::index_handler)
            .service(routes::views::low_stock_handler)
            .service(routes::views::all_inventory_handler)
            .service(routes::views::category_detail_handler)
            .service(
                web::scope("/auth")
                    .service(routes::auth::register_handler)
                    .service(routes::auth::register_form_handler)
                    .service(routes::auth::login_handler)
                    .service(routes::auth::login_form_handler)
                    .service(routes::auth::logout_handler),
            )
            .service(
                web::scope("/inventory")
                    .service(routes::inventory::add_item_handler)
                    .service(routes::inventory::add_item_form_handler)
                    .service(routes::inventory::edit_item_handler)
                    .service(routes::inventory::edit_item_form_handler)
                    .service(routes::inventory::delete_item_handler)
                    .service(routes::inventory::manage_categories_handler)
                    .service(routes::inventory::create_category_handler)
                    .service(routes::inventory::edit_category_handler)
                    .service(routes::inventory::edit_category_form_handler)
                    .service(routes::inventory::delete_category_handler),
            )
            .app_data(Data::new(AppState {
                db_pool: db_pool.clone(),
            }))
            .default_service(web::to(default_handler))
    })
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}

async fn default_handler(req_method: Method) -> Result<impl Responder, std::io::Error> {
    match req_method {
        Method::GET => {
            let file = NamedFile::open("static/404.html")?
                .customize()
                .with_status(StatusCode::NOT_FOUND);
            Ok(Either::Left(file))
        }
        _ => Ok(Either::Right(HttpResponse::MethodNotAllowed().finish())),
    }
}
