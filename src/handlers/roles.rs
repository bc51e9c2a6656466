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
use crate::models::rol::{RolCreate, RolEstado, RolIdQuery, RolNombreQuery, RolOut, RolUpdate};
use crate::models::MessageResponse;
use crate::AppState;

pub fn roles_routes(db: &Arc<DbPool>) -> Router<AppState> {
    let read = Router::new()
        .route("/roles/by-nombre", get(get_rol_by_nombre))
        .route("/roles/by-id", get(get_rol))
        .route("/roles/all-roles", get(list_roles));
    let create = Router::new().route("/roles/crear", post(create_rol));
    let update = Router::new()
        .route("/roles/by-id/:rol_id", put(update_rol))
        .route("/roles/cambiar-estado/:rol_id", put(cambiar_estado_rol));
    let remove = Router::new().route("/roles/by-id/:rol_id", delete(delete_rol));

    gated(db, Modulo::Roles, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::Roles, Accion::Insertar, create))
        .merge(gated(db, Modulo::Roles, Accion::Actualizar, update))
        .merge(gated(db, Modulo::Roles, Accion::Borrar, remove))
}

pub async fn create_rol(
    State(state): State<AppState>,
    Json(payload): Json<RolCreate>,
) -> Result<(StatusCode, Json<MessageResponse>), ServiceError> {
    payload.validate()?;
    state.services.roles.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Rol creado correctamente")),
    ))
}

pub async fn get_rol_by_nombre(
    State(state): State<AppState>,
    Query(query): Query<RolNombreQuery>,
) -> Result<Json<RolOut>, ServiceError> {
    Ok(Json(state.services.roles.get_by_nombre(&query.nombre).await?))
}

pub async fn get_rol(
    State(state): State<AppState>,
    Query(query): Query<RolIdQuery>,
) -> Result<Json<RolOut>, ServiceError> {
    Ok(Json(state.services.roles.get(query.rol_id).await?))
}

pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<RolOut>>, ServiceError> {
    Ok(Json(state.services.roles.list().await?))
}

pub async fn update_rol(
    State(state): State<AppState>,
    Path(rol_id): Path<i64>,
    Json(payload): Json<RolUpdate>,
) -> Result<Json<MessageResponse>, ServiceError> {
    payload.validate()?;
    state.services.roles.update(rol_id, payload).await?;
    Ok(Json(MessageResponse::new("Rol actualizado correctamente")))
}

pub async fn cambiar_estado_rol(
    State(state): State<AppState>,
    Path(rol_id): Path<i64>,
    Json(payload): Json<RolEstado>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state
        .services
        .roles
        .cambiar_estado(rol_id, payload.estado)
        .await?;
    Ok(Json(MessageResponse::new(
        "Estado del rol actualizado correctamente",
    )))
}

pub async fn delete_rol(
    State(state): State<AppState>,
    Path(rol_id): Path<i64>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.services.roles.delete(rol_id).await?;
    Ok(Json(MessageResponse::new("Rol eliminado correctamente")))
}
