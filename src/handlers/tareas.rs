use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

use super::gated;
use crate::auth::{verify_permissions, Accion, AuthUser, Modulo};
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::tarea::{TareaCreate, TareaOut, TareaUpdate};
use crate::models::MessageResponse;
use crate::AppState;

pub fn tareas_routes(db: &Arc<DbPool>) -> Router<AppState> {
    let read = Router::new().route("/tareas/todas", get(list_tareas));
    let create = Router::new().route("/tareas/crear", post(create_tarea));
    let update = Router::new()
        .route("/tareas/usuario/:id_usuario", put(update_tareas_by_usuario))
        .route("/tareas/:id_tarea", put(update_tarea));
    // Checked inside the handler: operarios may read their own tasks without the grant.
    let own = Router::new().route("/tareas/usuario/:id_usuario", get(list_tareas_by_usuario));

    gated(db, Modulo::Tareas, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::Tareas, Accion::Insertar, create))
        .merge(gated(db, Modulo::Tareas, Accion::Actualizar, update))
        .merge(own)
}

#[utoipa::path(
    get,
    path = "/tareas/todas",
    responses(
        (status = 200, description = "Every task", body = [TareaOut]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tareas"
)]
pub async fn list_tareas(State(state): State<AppState>) -> Result<Json<Vec<TareaOut>>, ServiceError> {
    Ok(Json(state.services.tareas.list().await?))
}

#[utoipa::path(
    post,
    path = "/tareas/crear",
    request_body = TareaCreate,
    responses(
        (status = 201, description = "Task created", body = MessageResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tareas"
)]
pub async fn create_tarea(
    State(state): State<AppState>,
    Json(payload): Json<TareaCreate>,
) -> Result<(StatusCode, Json<MessageResponse>), ServiceError> {
    payload.validate()?;
    state.services.tareas.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Tarea creada correctamente")),
    ))
}

/// Tasks assigned to a user.
///
/// Operarios may only ask for their own list; every other role needs the
/// `seleccionar` grant on tareas.
#[utoipa::path(
    get,
    path = "/tareas/usuario/{id_usuario}",
    params(("id_usuario" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Tasks of the user", body = [TareaOut]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "No hay tareas para este usuario", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tareas"
)]
pub async fn list_tareas_by_usuario(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id_usuario): Path<i64>,
) -> Result<Json<Vec<TareaOut>>, ServiceError> {
    if user.is_operario() {
        if user.id_usuario != id_usuario {
            warn!(
                id_usuario = user.id_usuario,
                requested = id_usuario,
                "operario asked for another user's tasks"
            );
            return Err(ServiceError::Unauthorized(
                "No tienes permiso para ver tareas de otros usuarios".to_string(),
            ));
        }
    } else if !verify_permissions(
        state.db.as_ref(),
        user.id_rol,
        Modulo::Tareas,
        Accion::Seleccionar,
    )
    .await?
    {
        return Err(ServiceError::not_authorized());
    }

    Ok(Json(state.services.tareas.list_by_usuario(id_usuario).await?))
}

pub async fn update_tareas_by_usuario(
    State(state): State<AppState>,
    Path(id_usuario): Path<i64>,
    Json(payload): Json<TareaUpdate>,
) -> Result<Json<MessageResponse>, ServiceError> {
    payload.validate()?;
    let affected = state
        .services
        .tareas
        .update_by_usuario(id_usuario, payload)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "{} tareas actualizadas correctamente",
        affected
    ))))
}

pub async fn update_tarea(
    State(state): State<AppState>,
    Path(id_tarea): Path<i64>,
    Json(payload): Json<TareaUpdate>,
) -> Result<Json<MessageResponse>, ServiceError> {
    payload.validate()?;
    state.services.tareas.update(id_tarea, payload).await?;
    Ok(Json(MessageResponse::new("Tarea actualizada correctamente")))
}
