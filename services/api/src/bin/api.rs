//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{chat_llm::OpenAiChatAdapter, db::PgStore, storage::S3MediaStorage},
    config::Config,
    error::ApiError,
    web::{
        admin::{claim_instructor_handler, list_users_handler},
        auth::{login_handler, logout_handler, signup_handler},
        billing::{checkout_handler, list_subscriptions_handler},
        chat::chat_handler,
        classes::{create_class_handler, get_class_handler, list_classes_handler, update_class_handler},
        courses::{
            create_course_handler, create_lecture_handler, delete_course_handler,
            get_course_handler, list_courses_handler, update_course_handler,
        },
        middleware::require_auth,
        rest::ApiDoc,
        sessions::{end_session_handler, list_sessions_handler, start_session_handler},
        state::AppState,
        uploads::upload_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client as S3Client;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);
    let chat_adapter = Arc::new(OpenAiChatAdapter::new(
        openai_client,
        config.chat_model.clone(),
    ));

    let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;
    let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);
    // Allow custom S3-compatible endpoints (e.g. MinIO) in development.
    if let Some(endpoint) = &config.s3_endpoint {
        s3_config_builder = s3_config_builder
            .endpoint_url(endpoint)
            .force_path_style(true);
    }
    let s3_client = S3Client::from_conf(s3_config_builder.build());
    let media_adapter = Arc::new(S3MediaStorage::new(
        s3_client,
        config.s3_bucket.clone(),
        config.s3_public_base_url.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        repo: store,
        config: config.clone(),
        chat: chat_adapter,
        media: media_adapter,
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes: catalog browsing and auth work without a session.
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/courses", get(list_courses_handler))
        .route("/courses/{slug}", get(get_course_handler))
        .route("/classes", get(list_classes_handler))
        .route("/classes/{id}", get(get_class_handler))
        .route("/live-sessions", get(list_sessions_handler));

    // Protected routes: mutations, billing, chat, and instructor tooling.
    let protected_routes = Router::new()
        .route("/courses", post(create_course_handler))
        .route(
            "/courses/{id}",
            put(update_course_handler).delete(delete_course_handler),
        )
        .route("/courses/{id}/lectures", post(create_lecture_handler))
        .route("/classes", post(create_class_handler))
        .route("/classes/{id}", put(update_class_handler))
        .route("/live-sessions", post(start_session_handler))
        .route("/live-sessions/{id}/end", post(end_session_handler))
        .route("/checkout", post(checkout_handler))
        .route("/billing/subscriptions", get(list_subscriptions_handler))
        .route("/chat", post(chat_handler))
        .route("/admin/users", get(list_users_handler))
        .route("/admin/instructor", post(claim_instructor_handler))
        .route("/uploads", post(upload_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
