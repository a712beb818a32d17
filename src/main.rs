use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use portal_catalog_api::database::DatabaseManager;
use portal_catalog_api::handlers;
use portal_catalog_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = portal_catalog_api::config::config();
    tracing::info!("Starting portal catalog API in {:?} mode", config.environment);

    if config.database.bootstrap_schema {
        if let Err(e) = DatabaseManager::ensure_schema().await {
            tracing::warn!("Schema bootstrap skipped: {}", e);
        }
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORTAL_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Portal catalog API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", post(handlers::auth::login))
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Browser access is limited to the origins in `security.cors_origins`
/// (override with SECURITY_CORS_ORIGINS). A `*` entry keeps the layer
/// fully permissive.
fn cors_layer() -> CorsLayer {
    let origins = &portal_catalog_api::config::config().security.cors_origins;
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn api_routes() -> Router {
    use handlers::{areas, projects};

    Router::new()
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        // Area-level operations
        .route("/api/areas", get(areas::list).post(areas::create))
        .route(
            "/api/areas/:name",
            put(areas::replace).delete(areas::remove),
        )
        // Project-level operations (read-modify-replace of the owning area)
        .route("/api/areas/:name/projects", post(projects::add))
        .route(
            "/api/areas/:name/projects/:project",
            put(projects::update).delete(projects::remove),
        )
        .route_layer(axum_middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Portal Catalog API",
            "version": version,
            "description": "Internal application portal backend - area/project catalog",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "areas": "/api/areas[/:name] (protected)",
                "projects": "/api/areas/:name/projects[/:project] (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
