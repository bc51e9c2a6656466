//! Line-item endpoints, mounted once per product category.
//!
//! `/detalle-huevos/*` and `/detalle-salvamento/*` share these handlers; the
//! category reaches them as a request extension.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use validator::Validate;

use super::gated;
use crate::auth::{Accion, Modulo};
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::detalle::{
    DetalleConVentaOut, DetalleCreate, DetalleIdQuery, DetalleOut, DetalleUpdate,
};
use crate::models::venta::VentaIdQuery;
use crate::models::{Categoria, MessageResponse};
use crate::AppState;

pub fn detalle_routes(db: &Arc<DbPool>) -> Router<AppState> {
    Categoria::ALL
        .iter()
        .fold(Router::new(), |router, categoria| {
            router.merge(categoria_routes(db, *categoria))
        })
}

fn categoria_routes(db: &Arc<DbPool>, categoria: Categoria) -> Router<AppState> {
    let base = format!("/detalle-{}", categoria.as_str());

    let read = Router::new()
        .route(&format!("{base}/by-id"), get(get_detalle))
        .route(&format!("{base}/by-venta"), get(list_detalles_by_venta));
    let create = Router::new().route(&format!("{base}/crear"), post(create_detalle));
    let update = Router::new().route(&format!("{base}/by-id/:detalle_id"), put(update_detalle));
    let remove = Router::new().route(
        &format!("{base}/by-id/:detalle_id"),
        axum::routing::delete(delete_detalle),
    );

    gated(db, Modulo::Ventas, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::Ventas, Accion::Insertar, create))
        .merge(gated(db, Modulo::Ventas, Accion::Actualizar, update))
        .merge(gated(db, Modulo::Ventas, Accion::Borrar, remove))
        .layer(Extension(categoria))
}

pub async fn create_detalle(
    State(state): State<AppState>,
    Extension(categoria): Extension<Categoria>,
    Json(payload): Json<DetalleCreate>,
) -> Result<(StatusCode, Json<DetalleOut>), ServiceError> {
    payload.validate()?;
    let detalle = state.services.detalle(categoria).create(payload).await?;
    Ok((StatusCode::CREATED, Json(detalle)))
}

pub async fn get_detalle(
    State(state): State<AppState>,
    Extension(categoria): Extension<Categoria>,
    Query(query): Query<DetalleIdQuery>,
) -> Result<Json<DetalleOut>, ServiceError> {
    Ok(Json(
        state.services.detalle(categoria).get(query.detalle_id).await?,
    ))
}

pub async fn list_detalles_by_venta(
    State(state): State<AppState>,
    Extension(categoria): Extension<Categoria>,
    Query(query): Query<VentaIdQuery>,
) -> Result<Json<Vec<DetalleConVentaOut>>, ServiceError> {
    Ok(Json(
        state
            .services
            .detalle(categoria)
            .list_by_venta(query.venta_id)
            .await?,
    ))
}

pub async fn update_detalle(
    State(state): State<AppState>,
    Extension(categoria): Extension<Categoria>,
    Path(detalle_id): Path<i64>,
    Json(payload): Json<DetalleUpdate>,
) -> Result<Json<DetalleOut>, ServiceError> {
    payload.validate()?;
    Ok(Json(
        state
            .services
            .detalle(categoria)
            .update(detalle_id, payload)
            .await?,
    ))
}

pub async fn delete_detalle(
    State(state): State<AppState>,
    Extension(categoria): Extension<Categoria>,
    Path(detalle_id): Path<i64>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.services.detalle(categoria).delete(detalle_id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Detalle de {} eliminado correctamente",
        categoria
    ))))
}
