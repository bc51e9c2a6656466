use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use validator::Validate;

use super::gated;
use crate::auth::{Accion, Modulo};
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::permiso::{PermisoAsignar, PermisoOut, PermisoRolQuery};
use crate::AppState;

pub fn permisos_routes(db: &Arc<DbPool>) -> Router<AppState> {
    let read = Router::new().route("/permisos/by-rol", get(list_permisos_by_rol));
    let update = Router::new().route("/permisos/asignar", put(asignar_permiso));

    gated(db, Modulo::Permisos, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::Permisos, Accion::Actualizar, update))
}

pub async fn list_permisos_by_rol(
    State(state): State<AppState>,
    Query(query): Query<PermisoRolQuery>,
) -> Result<Json<Vec<PermisoOut>>, ServiceError> {
    Ok(Json(state.services.permisos.list_by_rol(query.rol_id).await?))
}

/// Creates or replaces the flags a role holds on a module
pub async fn asignar_permiso(
    State(state): State<AppState>,
    Json(payload): Json<PermisoAsignar>,
) -> Result<Json<PermisoOut>, ServiceError> {
    payload.validate()?;
    Ok(Json(state.services.permisos.asignar(payload).await?))
}
