use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use feedback_backend::{
    AppState,
    config::Config,
    middleware::{log_errors, session_middleware},
    routes,
    session::SessionStore,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'feedback_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        sessions: SessionStore::new(pool),
    };

    // Routes that need a session context attached (and a cookie issued on
    // first contact).
    let session_routes = Router::new()
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/anonymous/token", get(routes::anonymous::get_anonymous_token))
        .route("/feedback", post(routes::feedback::submit_feedback))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    // Everything else resolves the caller (when required) through the bearer
    // extractor; role and ownership gates live in the handlers.
    let api_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/me", get(routes::auth::get_me))
        .route(
            "/feedback-boxes",
            post(routes::feedback_box::create_feedback_box)
                .get(routes::feedback_box::get_all_feedback_boxes),
        )
        .route(
            "/feedback-boxes/{id}",
            get(routes::feedback_box::get_feedback_box)
                .put(routes::feedback_box::update_feedback_box)
                .delete(routes::feedback_box::delete_feedback_box),
        )
        .route("/feedback/box/{box_id}", get(routes::feedback::get_feedback_by_box))
        .route("/feedback/{id}/approve", put(routes::feedback::approve_feedback))
        .route("/feedback/{id}", delete(routes::feedback::delete_feedback))
        .route("/admin/dashboard", get(routes::admin::get_dashboard_stats))
        .route("/admin/users", get(routes::admin::get_all_users))
        .route("/admin/users/{user_id}/role", put(routes::admin::update_user_role));

    let router = Router::new()
        .nest("/api", api_routes.merge(session_routes))
        .layer(axum::middleware::from_fn(log_errors));

    #[cfg(debug_assertions)]
    let router = router.layer(CorsLayer::permissive());

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
