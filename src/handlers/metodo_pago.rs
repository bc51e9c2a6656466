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
use crate::models::metodo_pago::{
    MetodoPagoCreate, MetodoPagoIdQuery, MetodoPagoOut, MetodoPagoUpdate,
};
use crate::models::MessageResponse;
use crate::AppState;

pub fn metodo_pago_routes(db: &Arc<DbPool>) -> Router<AppState> {
    let read = Router::new()
        .route("/metodo-pago/by-id", get(get_metodo_pago))
        .route("/metodo-pago/all-metodos-pago", get(list_metodos_pago));
    let create = Router::new().route("/metodo-pago/crear", post(create_metodo_pago));
    let update = Router::new().route(
        "/metodo-pago/by-id/:metodo_pago_id",
        put(update_metodo_pago),
    );

    gated(db, Modulo::MetodoPago, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::MetodoPago, Accion::Insertar, create))
        .merge(gated(db, Modulo::MetodoPago, Accion::Actualizar, update))
}

pub async fn create_metodo_pago(
    State(state): State<AppState>,
    Json(payload): Json<MetodoPagoCreate>,
) -> Result<(StatusCode, Json<MessageResponse>), ServiceError> {
    payload.validate()?;
    state.services.metodo_pago.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Método de pago creado correctamente")),
    ))
}

pub async fn get_metodo_pago(
    State(state): State<AppState>,
    Query(query): Query<MetodoPagoIdQuery>,
) -> Result<Json<MetodoPagoOut>, ServiceError> {
    Ok(Json(
        state.services.metodo_pago.get(query.metodo_pago_id).await?,
    ))
}

pub async fn list_metodos_pago(
    State(state): State<AppState>,
) -> Result<Json<Vec<MetodoPagoOut>>, ServiceError> {
    Ok(Json(state.services.metodo_pago.list().await?))
}

pub async fn update_metodo_pago(
    State(state): State<AppState>,
    Path(metodo_pago_id): Path<i64>,
    Json(payload): Json<MetodoPagoUpdate>,
) -> Result<Json<MessageResponse>, ServiceError> {
    payload.validate()?;
    state
        .services
        .metodo_pago
        .update(metodo_pago_id, payload)
        .await?;
    Ok(Json(MessageResponse::new(
        "Método de pago actualizado correctamente",
    )))
}
