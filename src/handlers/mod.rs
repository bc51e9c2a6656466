pub mod detalle;
pub mod metodo_pago;
pub mod modulos;
pub mod permisos;
pub mod roles;
pub mod stock;
pub mod tareas;
pub mod ventas;

use crate::auth::{AuthRouterExt, PermissionGate};
use crate::db::DbPool;
use crate::models::Categoria;
use crate::services::{
    detalle::DetalleService, metodo_pago::MetodoPagoService, modulos::ModuloService,
    permisos::PermisoService, roles::RolService, stock::StockService, tareas::TareaService,
    ventas::VentaService,
};
use axum::Router;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub ventas: Arc<VentaService>,
    pub detalle_huevos: Arc<DetalleService>,
    pub detalle_salvamento: Arc<DetalleService>,
    pub stock: Arc<StockService>,
    pub metodo_pago: Arc<MetodoPagoService>,
    pub roles: Arc<RolService>,
    pub modulos: Arc<ModuloService>,
    pub permisos: Arc<PermisoService>,
    pub tareas: Arc<TareaService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, default_metodo_pago_id: i64) -> Self {
        Self {
            ventas: Arc::new(VentaService::new(db_pool.clone(), default_metodo_pago_id)),
            detalle_huevos: Arc::new(DetalleService::new(db_pool.clone(), Categoria::Huevos)),
            detalle_salvamento: Arc::new(DetalleService::new(
                db_pool.clone(),
                Categoria::Salvamento,
            )),
            stock: Arc::new(StockService::new(db_pool.clone())),
            metodo_pago: Arc::new(MetodoPagoService::new(db_pool.clone())),
            roles: Arc::new(RolService::new(db_pool.clone())),
            modulos: Arc::new(ModuloService::new(db_pool.clone())),
            permisos: Arc::new(PermisoService::new(db_pool.clone())),
            tareas: Arc::new(TareaService::new(db_pool)),
        }
    }

    /// Line-item service for one product category
    pub fn detalle(&self, categoria: Categoria) -> &DetalleService {
        match categoria {
            Categoria::Huevos => &self.detalle_huevos,
            Categoria::Salvamento => &self.detalle_salvamento,
        }
    }
}

/// Wraps `routes` in the permission gate for `modulo`/`accion`.
pub(crate) fn gated(
    db: &Arc<DbPool>,
    modulo: crate::auth::Modulo,
    accion: crate::auth::Accion,
    routes: Router<AppState>,
) -> Router<AppState> {
    routes.with_permission(PermissionGate::new(db.clone(), modulo, accion))
}
