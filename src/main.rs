use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{delete, get, post, put},
    Router,
};
use dotenv::dotenv;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod bookmarks;
mod comments;
mod config;
mod engagement;
mod entries;
mod error;
mod extract;
mod follows;
mod response;
mod store;
mod users;

use config::settings::Settings;
use store::{PgSocialStore, SharedStore};

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    settings: Settings,
    store: SharedStore,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> PgPool {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(app_state: &AppState) -> SharedStore {
        app_state.store.clone()
    }
}

fn app(app_state: AppState) -> Router {
    let auth_router = Router::new()
        .route("/sign-in", post(auth::handler::login))
        .route("/sign-up", post(auth::handler::signup));

    let user_router = Router::new()
        .route("/", get(users::handler::search_users))
        .route(
            "/me",
            get(users::handler::get_me).patch(users::handler::update_me),
        )
        .route("/:id", get(users::handler::get_user_profile));

    let follow_router = Router::new().route(
        "/",
        get(follows::handler::list_follows)
            .post(follows::handler::follow_user)
            .patch(follows::handler::respond_to_follow)
            .delete(follows::handler::unfollow_user),
    );

    let entry_router = Router::new()
        .route(
            "/",
            get(entries::handler::list_entries).post(entries::handler::create_entry),
        )
        .route(
            "/:id",
            get(entries::handler::get_entry)
                .put(entries::handler::update_entry)
                .delete(entries::handler::delete_entry),
        );

    let bookmark_router = Router::new()
        .route(
            "/",
            get(bookmarks::handler::list_bookmarks).post(bookmarks::handler::create_bookmark),
        )
        .route(
            "/:id",
            put(bookmarks::handler::update_bookmark).delete(bookmarks::handler::delete_bookmark),
        );

    let comment_router = Router::new()
        .route(
            "/",
            get(comments::handler::list_comments).post(comments::handler::create_comment),
        )
        .route("/:id", delete(comments::handler::delete_comment));

    Router::new()
        .route("/", get(|| async { "Today I Learned" }))
        .nest("/api/auth", auth_router)
        .nest("/api/users", user_router)
        .nest("/api/follow", follow_router)
        .nest("/api/entries", entry_router)
        .route("/api/feed", get(entries::handler::get_feed))
        .route(
            "/api/likes",
            post(engagement::handler::like_entry).delete(engagement::handler::unlike_entry),
        )
        .route(
            "/api/saved",
            get(engagement::handler::list_saved)
                .post(engagement::handler::save_entry)
                .delete(engagement::handler::unsave_entry),
        )
        .nest("/api/comments", comment_router)
        .nest("/api/bookmarks", bookmark_router)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;

    info!("database connected");

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("migrations applied");

    let app_state = AppState {
        store: Arc::new(PgSocialStore::new(pool.clone())),
        pool,
        settings: settings.clone(),
    };

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app(app_state)).await?;

    Ok(())
}
