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
use crate::models::detalle::DetalleVentaOut;
use crate::models::venta::{
    RangoFechasQuery, TipoPagoQuery, UsuarioQuery, VentaCreada, VentaCreate, VentaEstado,
    VentaFiltro, VentaIdQuery, VentaOut, VentaPage, VentaUpdate,
};
use crate::models::{MessageResponse, PaginationParams};
use crate::AppState;

pub fn ventas_routes(db: &Arc<DbPool>) -> Router<AppState> {
    let read = Router::new()
        .route("/ventas/all-ventas", get(list_ventas))
        .route("/ventas/all-by-fecha", get(list_ventas_by_fecha))
        .route("/ventas/all-by-usuario", get(list_ventas_by_usuario))
        .route("/ventas/all-by-tipo-pago", get(list_ventas_by_tipo_pago))
        .route("/ventas/by-id", get(get_venta))
        .route("/ventas/detalles", get(get_venta_detalles));

    let create = Router::new().route("/ventas/crear", post(create_venta));

    let update = Router::new()
        .route("/ventas/by-id/:venta_id", put(update_venta))
        .route("/ventas/cambiar-estado/:venta_id", put(cambiar_estado_venta));

    let remove = Router::new().route("/ventas/by-id/:venta_id", delete(delete_venta));

    gated(db, Modulo::Ventas, Accion::Seleccionar, read)
        .merge(gated(db, Modulo::Ventas, Accion::Insertar, create))
        .merge(gated(db, Modulo::Ventas, Accion::Actualizar, update))
        .merge(gated(db, Modulo::Ventas, Accion::Borrar, remove))
}

async fn page_of(
    state: &AppState,
    filtro: VentaFiltro,
    pagination: &PaginationParams,
) -> Result<Json<VentaPage>, ServiceError> {
    let page = pagination.resolve(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    )?;
    let ventas = state.services.ventas.list(filtro, page).await?;
    Ok(Json(ventas))
}

/// Create a sale
#[utoipa::path(
    post,
    path = "/ventas/crear",
    request_body = VentaCreate,
    responses(
        (status = 201, description = "Venta creada correctamente", body = VentaCreada),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn create_venta(
    State(state): State<AppState>,
    Json(payload): Json<VentaCreate>,
) -> Result<(StatusCode, Json<VentaCreada>), ServiceError> {
    payload.validate()?;
    let venta = state.services.ventas.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(VentaCreada {
            message: "Venta creada correctamente".to_string(),
            venta,
        }),
    ))
}

/// List every sale
#[utoipa::path(
    get,
    path = "/ventas/all-ventas",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of sales", body = VentaPage),
        (status = 400, description = "Invalid pagination", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn list_ventas(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<VentaPage>, ServiceError> {
    page_of(&state, VentaFiltro::Todas, &pagination).await
}

/// List sales between two calendar dates, both inclusive
#[utoipa::path(
    get,
    path = "/ventas/all-by-fecha",
    params(RangoFechasQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of sales", body = VentaPage),
        (status = 400, description = "Invalid range or pagination", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn list_ventas_by_fecha(
    State(state): State<AppState>,
    Query(rango): Query<RangoFechasQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<VentaPage>, ServiceError> {
    if rango.fecha_fin < rango.fecha_inicio {
        return Err(ServiceError::BadRequest(
            "fecha_fin no puede ser anterior a fecha_inicio".to_string(),
        ));
    }
    let filtro = VentaFiltro::PorFecha {
        desde: rango.fecha_inicio,
        hasta: rango.fecha_fin,
    };
    page_of(&state, filtro, &pagination).await
}

/// List sales registered by a user
#[utoipa::path(
    get,
    path = "/ventas/all-by-usuario",
    params(UsuarioQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of sales", body = VentaPage),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn list_ventas_by_usuario(
    State(state): State<AppState>,
    Query(query): Query<UsuarioQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<VentaPage>, ServiceError> {
    page_of(&state, VentaFiltro::PorUsuario(query.id_usuario), &pagination).await
}

/// List sales paid with a payment method
#[utoipa::path(
    get,
    path = "/ventas/all-by-tipo-pago",
    params(TipoPagoQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of sales", body = VentaPage),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn list_ventas_by_tipo_pago(
    State(state): State<AppState>,
    Query(query): Query<TipoPagoQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<VentaPage>, ServiceError> {
    page_of(&state, VentaFiltro::PorTipoPago(query.tipo_pago), &pagination).await
}

#[utoipa::path(
    get,
    path = "/ventas/by-id",
    params(VentaIdQuery),
    responses(
        (status = 200, description = "Sale found", body = VentaOut),
        (status = 404, description = "Venta no encontrada", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn get_venta(
    State(state): State<AppState>,
    Query(query): Query<VentaIdQuery>,
) -> Result<Json<VentaOut>, ServiceError> {
    Ok(Json(state.services.ventas.get(query.venta_id).await?))
}

/// Change the user or payment method of an active sale
#[utoipa::path(
    put,
    path = "/ventas/by-id/{venta_id}",
    params(("venta_id" = i64, Path, description = "Sale id")),
    request_body = VentaUpdate,
    responses(
        (status = 200, description = "Venta actualizada correctamente", body = MessageResponse),
        (status = 400, description = "Empty body or cancelled sale", body = crate::errors::ErrorResponse),
        (status = 404, description = "Venta no encontrada", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn update_venta(
    State(state): State<AppState>,
    Path(venta_id): Path<i64>,
    Json(payload): Json<VentaUpdate>,
) -> Result<Json<MessageResponse>, ServiceError> {
    payload.validate()?;
    state.services.ventas.update(venta_id, payload).await?;
    Ok(Json(MessageResponse::new("Venta actualizada correctamente")))
}

/// Cancel a sale, returning its items to stock
#[utoipa::path(
    put,
    path = "/ventas/cambiar-estado/{venta_id}",
    params(("venta_id" = i64, Path, description = "Sale id")),
    request_body = VentaEstado,
    responses(
        (status = 200, description = "Estado updated", body = MessageResponse),
        (status = 400, description = "Sale already cancelled", body = crate::errors::ErrorResponse),
        (status = 404, description = "Venta no encontrada", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn cambiar_estado_venta(
    State(state): State<AppState>,
    Path(venta_id): Path<i64>,
    Json(payload): Json<VentaEstado>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let cancelada = state
        .services
        .ventas
        .cambiar_estado(venta_id, payload.estado)
        .await?;
    let message = if cancelada {
        "Venta cancelada y stock restaurado correctamente"
    } else {
        "Estado de la venta actualizado correctamente"
    };
    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    delete,
    path = "/ventas/by-id/{venta_id}",
    params(("venta_id" = i64, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Sale deleted", body = MessageResponse),
        (status = 400, description = "Solo se pueden eliminar ventas canceladas", body = crate::errors::ErrorResponse),
        (status = 404, description = "Venta no encontrada", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn delete_venta(
    State(state): State<AppState>,
    Path(venta_id): Path<i64>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.services.ventas.delete(venta_id).await?;
    Ok(Json(MessageResponse::new("Venta eliminada correctamente")))
}

/// Every line item of a sale, both categories
#[utoipa::path(
    get,
    path = "/ventas/detalles",
    params(VentaIdQuery),
    responses(
        (status = 200, description = "Line items", body = [DetalleVentaOut]),
        (status = 404, description = "Venta no encontrada", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "ventas"
)]
pub async fn get_venta_detalles(
    State(state): State<AppState>,
    Query(query): Query<VentaIdQuery>,
) -> Result<Json<Vec<DetalleVentaOut>>, ServiceError> {
    Ok(Json(state.services.ventas.detalles(query.venta_id).await?))
}
