mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, ConfirmationCodes, TokenService};
use crate::features::categories::routes as categories_routes;
use crate::features::categories::services::{CategoryService, GenreService};
use crate::features::reviews::routes as reviews_routes;
use crate::features::reviews::services::{CommentService, ReviewService};
use crate::features::titles::routes as titles_routes;
use crate::features::titles::services::TitleService;
use crate::features::users::routes as users_routes;
use crate::features::users::services::UserService;
use crate::modules::mail::build_mailer;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // Users (also backs the auth middleware)
    let user_service = Arc::new(UserService::new(pool.clone()));
    if let Some((username, email)) = config.bootstrap.superuser() {
        user_service.ensure_superuser(username, email).await?;
    }
    tracing::info!("User service initialized");

    // Auth: JWT issuing, confirmation codes and mail delivery
    let token_service = Arc::new(TokenService::new(&config.auth));
    let mailer = build_mailer(&config.mail)?;
    tracing::info!("Mailer initialized (backend: {:?})", config.mail.backend);
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_service),
        Arc::clone(&token_service),
        ConfirmationCodes::new(&config.auth.confirmation_code_secret),
        mailer,
        config.mail.from.clone(),
        &config.app.api_prefix,
    ));
    let auth_state = Arc::new(middleware::AuthState {
        tokens: Arc::clone(&token_service),
        users: Arc::clone(&user_service),
    });
    tracing::info!("Auth service initialized");

    // Catalog and reviews
    let category_service = Arc::new(CategoryService::new(pool.clone()));
    let genre_service = Arc::new(GenreService::new(pool.clone()));
    let title_service = Arc::new(TitleService::new(pool.clone()));
    let review_service = Arc::new(ReviewService::new(pool.clone()));
    let comment_service = Arc::new(CommentService::new(pool.clone()));
    tracing::info!("Catalog and review services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
        api_prefix: config.app.api_prefix.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Resource routes resolve the caller from an optional bearer token
    let resource_routes = Router::new()
        .merge(users_routes::routes(user_service))
        .merge(categories_routes::routes(category_service, genre_service))
        .merge(titles_routes::routes(title_service))
        .merge(reviews_routes::routes(review_service, comment_service))
        .route_layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    let api_routes = Router::new()
        .merge(auth_routes::routes(auth_service))
        .merge(resource_routes);

    let api_routes = if config.app.api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(&config.app.api_prefix, api_routes)
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Trailing slashes are trimmed before routing, so `/titles/` matches
    // `/titles`. Swagger UI stays outside: it redirects `/swagger-ui` to
    // `/swagger-ui/` itself.
    let api = NormalizePathLayer::trim_trailing_slash().layer(api_routes.merge(health_route));

    let app = Router::new()
        .merge(swagger)
        .fallback_service(api)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
