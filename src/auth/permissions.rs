//! Role / module / action permission matrix.

use super::AuthUser;
use crate::db::{self, DbPool};
use crate::errors::ServiceError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sea_orm::{ConnectionTrait, FromQueryResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Protected areas of the API, by their seeded `modulos.id_modulo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulo {
    Roles = 1,
    Modulos = 3,
    Stock = 4,
    Ventas = 5,
    Tareas = 6,
    Permisos = 7,
    MetodoPago = 8,
}

impl Modulo {
    pub fn id(self) -> i64 {
        self as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accion {
    Insertar,
    Actualizar,
    Seleccionar,
    Borrar,
}

impl Accion {
    /// Column of `permisos` holding this action's flag
    pub fn column(self) -> &'static str {
        match self {
            Accion::Insertar => "insertar",
            Accion::Actualizar => "actualizar",
            Accion::Seleccionar => "seleccionar",
            Accion::Borrar => "borrar",
        }
    }
}

impl fmt::Display for Accion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, FromQueryResult)]
struct PermisoFlag {
    permitido: bool,
    rol_activo: bool,
}

/// Whether `id_rol` may perform `accion` on `modulo`.
///
/// Missing rows and inactive roles deny.
pub async fn verify_permissions<C>(
    conn: &C,
    id_rol: i64,
    modulo: Modulo,
    accion: Accion,
) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    let sql = format!(
        "SELECT p.{} AS permitido, r.estado AS rol_activo \
         FROM permisos p JOIN roles r ON r.id_rol = p.id_rol \
         WHERE p.id_rol = ? AND p.id_modulo = ?",
        accion.column()
    );
    let flag: Option<PermisoFlag> =
        db::query_one(conn, &sql, vec![id_rol.into(), modulo.id().into()]).await?;

    Ok(flag.map_or(false, |f| f.permitido && f.rol_activo))
}

/// Route-layer state naming what a group of routes requires
#[derive(Clone)]
pub struct PermissionGate {
    db: Arc<DbPool>,
    modulo: Modulo,
    accion: Accion,
}

impl PermissionGate {
    pub fn new(db: Arc<DbPool>, modulo: Modulo, accion: Accion) -> Self {
        Self { db, modulo, accion }
    }
}

/// Rejects the request unless the authenticated user's role holds the gate's permission.
pub async fn permission_middleware(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(ServiceError::not_authorized)?;

    if !verify_permissions(gate.db.as_ref(), user.id_rol, gate.modulo, gate.accion).await? {
        warn!(
            id_usuario = user.id_usuario,
            id_rol = user.id_rol,
            modulo = ?gate.modulo,
            accion = %gate.accion,
            "permission denied"
        );
        return Err(ServiceError::not_authorized());
    }

    debug!(modulo = ?gate.modulo, accion = %gate.accion, "permission granted");
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulo_ids_match_seed_data() {
        assert_eq!(Modulo::Roles.id(), 1);
        assert_eq!(Modulo::Stock.id(), 4);
        assert_eq!(Modulo::Ventas.id(), 5);
        assert_eq!(Modulo::MetodoPago.id(), 8);
    }

    #[test]
    fn actions_map_to_fixed_columns() {
        let columns: Vec<_> = [
            Accion::Insertar,
            Accion::Actualizar,
            Accion::Seleccionar,
            Accion::Borrar,
        ]
        .into_iter()
        .map(Accion::column)
        .collect();
        assert_eq!(columns, ["insertar", "actualizar", "seleccionar", "borrar"]);
    }
}
