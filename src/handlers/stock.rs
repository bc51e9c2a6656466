use axum::{
    extract::{Path, Query, State},
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
use crate::models::stock::{ProductoCreate, ProductoIdQuery, StockOut, StockUpdate};
use crate::AppState;

pub fn stock_routes(db: &Arc<DbPool>) -> Router<AppState> {
    let read = Router::new()
        .route("/stock/all", get(list_stock))
        .route("/stock/by-producto", get(get_stock));
    let create = Router::new().route("/stock/crear", post(create_producto));
    let update = Router::new().route("/stock/by-producto/:producto_id", put(set_stock));

    gated(db, Modulo::Stock, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::Stock, Accion::Insertar, create))
        .merge(gated(db, Modulo::Stock, Accion::Actualizar, update))
}

/// Register a product together with its stock counter
#[utoipa::path(
    post,
    path = "/stock/crear",
    request_body = ProductoCreate,
    responses(
        (status = 201, description = "Product created", body = StockOut),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate product", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "stock"
)]
pub async fn create_producto(
    State(state): State<AppState>,
    Json(payload): Json<ProductoCreate>,
) -> Result<(StatusCode, Json<StockOut>), ServiceError> {
    payload.validate()?;
    let producto = state.services.stock.create_producto(payload).await?;
    Ok((StatusCode::CREATED, Json(producto)))
}

#[utoipa::path(
    get,
    path = "/stock/all",
    responses(
        (status = 200, description = "Stock per product", body = [StockOut]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "stock"
)]
pub async fn list_stock(State(state): State<AppState>) -> Result<Json<Vec<StockOut>>, ServiceError> {
    Ok(Json(state.services.stock.list().await?))
}

#[utoipa::path(
    get,
    path = "/stock/by-producto",
    params(ProductoIdQuery),
    responses(
        (status = 200, description = "Stock of the product", body = StockOut),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "stock"
)]
pub async fn get_stock(
    State(state): State<AppState>,
    Query(query): Query<ProductoIdQuery>,
) -> Result<Json<StockOut>, ServiceError> {
    Ok(Json(state.services.stock.get(query.producto_id).await?))
}

/// Overwrite the available quantity after a production intake or a physical count
#[utoipa::path(
    put,
    path = "/stock/by-producto/{producto_id}",
    params(("producto_id" = i64, Path, description = "Product id")),
    request_body = StockUpdate,
    responses(
        (status = 200, description = "Stock updated", body = StockOut),
        (status = 400, description = "Negative quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "stock"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    Path(producto_id): Path<i64>,
    Json(payload): Json<StockUpdate>,
) -> Result<Json<StockOut>, ServiceError> {
    payload.validate()?;
    Ok(Json(
        state
            .services
            .stock
            .set_cantidad(producto_id, payload)
            .await?,
    ))
}
