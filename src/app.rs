use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::RevocationList;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryProductStore, PgProductStore, ProductStore};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::ProductService;

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub products: ProductService,
    pub revocations: RevocationList,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ProductStore>) -> Self {
        Self {
            config: Arc::new(config),
            products: ProductService::new(store),
            revocations: RevocationList::new(),
        }
    }

    /// PostgreSQL when `DATABASE_URL` is configured, memory otherwise
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ProductStore> = if config.database.url.is_some() {
            let pool = DatabaseManager::connect(&config.database).await?;
            let store = PgProductStore::new(pool);
            store.ensure_schema().await?;
            Arc::new(store)
        } else {
            tracing::warn!("DATABASE_URL not set; products are kept in memory");
            Arc::new(MemoryProductStore::new())
        };
        Ok(Self::new(config, store))
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let protected = Router::new()
        .route(
            "/api/products",
            get(protected::products::index).post(protected::products::store),
        )
        .route(
            "/api/products/:id",
            get(protected::products::show)
                .put(protected::products::update)
                .delete(protected::products::destroy),
        )
        .route("/api/logout", post(protected::session::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
