use crate::db::{self, DbPool};
use crate::errors::ServiceError;
use crate::models::permiso::{PermisoAsignar, PermisoOut};
use sea_orm::{ConnectionTrait, FromQueryResult, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};

const SELECT: &str = "SELECT p.id_rol, p.id_modulo, m.nombre_modulo, p.insertar, p.actualizar, p.seleccionar, p.borrar \
     FROM permisos p JOIN modulos m ON m.id_modulo = p.id_modulo";

#[derive(Debug, FromQueryResult)]
struct Existe {
    #[allow(dead_code)]
    id: i64,
}

async fn existe<C>(conn: &C, sql: &str, id: i64) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    let row: Option<Existe> = db::query_one(conn, sql, vec![id.into()]).await?;
    Ok(row.is_some())
}

#[derive(Clone)]
pub struct PermisoService {
    db_pool: Arc<DbPool>,
}

impl PermisoService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_by_rol(&self, id_rol: i64) -> Result<Vec<PermisoOut>, ServiceError> {
        Ok(db::query_all(
            self.db_pool.as_ref(),
            &format!("{} WHERE p.id_rol = ? ORDER BY p.id_modulo", SELECT),
            vec![id_rol.into()],
        )
        .await?)
    }

    /// Creates or replaces the permission row for a role and module
    #[instrument(skip(self))]
    pub async fn asignar(&self, permiso: PermisoAsignar) -> Result<PermisoOut, ServiceError> {
        let txn = self.db_pool.begin().await?;

        if !existe(&txn, "SELECT id_rol AS id FROM roles WHERE id_rol = ?", permiso.id_rol).await? {
            return Err(ServiceError::NotFound(format!("Rol {} no encontrado", permiso.id_rol)));
        }
        if !existe(
            &txn,
            "SELECT id_modulo AS id FROM modulos WHERE id_modulo = ?",
            permiso.id_modulo,
        )
        .await?
        {
            return Err(ServiceError::NotFound(format!(
                "Módulo {} no encontrado",
                permiso.id_modulo
            )));
        }

        let flags = || -> Vec<sea_orm::Value> {
            vec![
                permiso.insertar.into(),
                permiso.actualizar.into(),
                permiso.seleccionar.into(),
                permiso.borrar.into(),
            ]
        };

        let mut values = flags();
        values.push(permiso.id_rol.into());
        values.push(permiso.id_modulo.into());
        let updated = db::execute(
            &txn,
            "UPDATE permisos SET insertar = ?, actualizar = ?, seleccionar = ?, borrar = ? \
             WHERE id_rol = ? AND id_modulo = ?",
            values,
        )
        .await?;

        if updated == 0 {
            let mut values = vec![permiso.id_rol.into(), permiso.id_modulo.into()];
            values.extend(flags());
            db::execute(
                &txn,
                "INSERT INTO permisos (id_rol, id_modulo, insertar, actualizar, seleccionar, borrar) \
                 VALUES (?, ?, ?, ?, ?, ?)",
                values,
            )
            .await?;
        }

        let asignado: PermisoOut = db::query_one(
            &txn,
            &format!("{} WHERE p.id_rol = ? AND p.id_modulo = ?", SELECT),
            vec![permiso.id_rol.into(), permiso.id_modulo.into()],
        )
        .await?
        .ok_or_else(|| ServiceError::InternalError("permiso no encontrado tras asignar".to_string()))?;

        db::commit(txn, "permisos.asignar").await?;

        info!(
            id_rol = permiso.id_rol,
            id_modulo = permiso.id_modulo,
            created = updated == 0,
            "permission assigned"
        );
        Ok(asignado)
    }
}
