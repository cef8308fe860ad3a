use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::cookies::CookiePolicy;
use crate::auth::TokenService;
use crate::config::{AppConfig, ConfigError};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AccountService, ExportClient, NoteService, NotebookService};

/// Everything a handler may need, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub cookies: CookiePolicy,
    pub accounts: AccountService,
    pub notebooks: NotebookService,
    pub notes: NoteService,
    pub export: ExportClient,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, ConfigError> {
        config.validate()?;

        let tokens = TokenService::new(&config.security)?;
        let cookies = CookiePolicy::from(&config.security);
        let export = ExportClient::new(&config.export)?;

        Ok(Self {
            accounts: AccountService::new(store.clone(), tokens.clone()),
            notebooks: NotebookService::new(store.clone()),
            notes: NoteService::new(store.clone()),
            config: Arc::new(config),
            store,
            tokens,
            cookies,
            export,
        })
    }
}

/// Build the full router: public auth routes, bearer-protected resource routes
/// and the global middleware stack.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(&state))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
        .route("/refresh-token", post(auth::refresh_post))
        .route("/logout", post(auth::logout_post))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use protected::{me, notebooks, notes};

    Router::new()
        // Account
        .route("/me", get(me::get))
        .route("/me/username", put(me::username_put))
        // Notebooks
        .route("/notebooks", get(notebooks::list).post(notebooks::create))
        .route("/notebooks/count", get(notebooks::count))
        .route(
            "/notebooks/:id",
            get(notebooks::get).put(notebooks::update).delete(notebooks::delete),
        )
        .route("/notebooks/:id/name", get(notebooks::name))
        .route("/notebooks/:id/export", post(notebooks::export))
        // Notes within a notebook
        .route("/notebooks/:id/notes", get(notes::list))
        .route("/notebooks/:id/notes/page", get(notes::page))
        .route("/notebooks/:id/notes/count", get(notes::count))
        .route("/notebooks/:id/notes/:note_id", get(notes::get))
        // Notes
        .route("/notes", post(notes::create))
        .route("/notes/:id", put(notes::update).delete(notes::delete))
        .route("/notes/:id/export", post(notes::export))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ))
}

/// Permissive when no origins are configured; otherwise an explicit allow-list
/// with credentials so browsers send the session cookies.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
