use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use validator::Validate;

use super::gated;
use crate::auth::{Accion, Modulo};
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::modulo::{ModuloCreate, ModuloIdQuery, ModuloOut, ModuloUpdate};
use crate::models::MessageResponse;
use crate::AppState;

pub fn modulos_routes(db: &Arc<DbPool>) -> Router<AppState> {
    let read = Router::new()
        .route("/modulos/by-id", get(get_modulo))
        .route("/modulos/all-modulos", get(list_modulos));
    let create = Router::new().route("/modulos/crear", post(create_modulo));
    let update = Router::new().route("/modulos/by-id/:modulo_id", put(update_modulo));
    let remove = Router::new().route("/modulos/by-id/:modulo_id", delete(delete_modulo));

    gated(db, Modulo::Modulos, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::Modulos, Accion::Insertar, create))
        .merge(gated(db, Modulo::Modulos, Accion::Actualizar, update))
        .merge(gated(db, Modulo::Modulos, Accion::Borrar, remove))
}

pub async fn create_modulo(
    State(state): State<AppState>,
    Json(payload): Json<ModuloCreate>,
) -> Result<(StatusCode, Json<ModuloOut>), ServiceError> {
    payload.validate()?;
    let modulo = state.services.modulos.create(payload).await?;
    Ok((StatusCode::CREATED, Json(modulo)))
}

pub async fn get_modulo(
    State(state): State<AppState>,
    Query(query): Query<ModuloIdQuery>,
) -> Result<Json<ModuloOut>, ServiceError> {
    Ok(Json(state.services.modulos.get(query.modulo_id).await?))
}

pub async fn list_modulos(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModuloOut>>, ServiceError> {
    Ok(Json(state.services.modulos.list().await?))
}

pub async fn update_modulo(
    State(state): State<AppState>,
    Path(modulo_id): Path<i64>,
    Json(payload): Json<ModuloUpdate>,
) -> Result<Json<MessageResponse>, ServiceError> {
    payload.validate()?;
    state.services.modulos.update(modulo_id, payload).await?;
    Ok(Json(MessageResponse::new("Módulo actualizado correctamente")))
}

pub async fn delete_modulo(
    State(state): State<AppState>,
    Path(modulo_id): Path<i64>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.services.modulos.delete(modulo_id).await?;
    Ok(Json(MessageResponse::new("Módulo eliminado correctamente")))
}
