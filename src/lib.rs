//! Granja API Library
//!
//! HTTP backend for an egg farm: sales with per-category line items that keep stock
//! consistent, role/module permissions, payment methods and staff tasks.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AuthConfig, AuthRouterExt, AuthService};
use crate::db::DbPool;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config), db.clone()));
        let services = handlers::AppServices::new(db.clone(), config.default_metodo_pago_id);
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

/// Every protected route group, each behind its permission gate
pub fn api_routes(db: &Arc<DbPool>) -> Router<AppState> {
    Router::new()
        .merge(handlers::ventas::ventas_routes(db))
        .merge(handlers::detalle::detalle_routes(db))
        .merge(handlers::stock::stock_routes(db))
        .merge(handlers::metodo_pago::metodo_pago_routes(db))
        .merge(handlers::roles::roles_routes(db))
        .merge(handlers::modulos::modulos_routes(db))
        .merge(handlers::permisos::permisos_routes(db))
        .merge(handlers::tareas::tareas_routes(db))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "ok gestion granja",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Full application router: public routes, the authenticated API, docs, and the
/// request-id and tracing layers.
pub fn build_router(state: AppState) -> Router {
    let api = api_routes(&state.db).with_auth(state.auth.clone());

    Router::new()
        .route("/", get(root))
        .merge(api)
        .with_state(state.clone())
        .nest("/health", health::health_routes(state.db.clone()))
        .nest("/access", auth::auth_routes().with_state(state.auth.clone()))
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            crate::tracing::request_id_middleware,
        ))
}
