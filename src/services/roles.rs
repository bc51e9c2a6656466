use crate::db::{self, DbPool, PartialUpdate};
use crate::errors::ServiceError;
use crate::models::rol::{RolCreate, RolOut, RolUpdate};
use sea_orm::{FromQueryResult, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const SELECT: &str = "SELECT id_rol, nombre_rol, descripcion, estado FROM roles";

#[derive(Debug, FromQueryResult)]
struct UsuariosDelRol {
    total: i64,
}

fn rol_no_encontrado(id_rol: i64) -> ServiceError {
    ServiceError::NotFound(format!("Rol {} no encontrado", id_rol))
}

#[derive(Clone)]
pub struct RolService {
    db_pool: Arc<DbPool>,
}

impl RolService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Duplicate names surface as a conflict from the unique index
    #[instrument(skip(self))]
    pub async fn create(&self, rol: RolCreate) -> Result<i64, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let id_rol = db::insert_returning_id(
            &txn,
            "INSERT INTO roles (nombre_rol, descripcion, estado) VALUES (?, ?, ?) RETURNING id_rol",
            vec![rol.nombre_rol.into(), rol.descripcion.into(), rol.estado.into()],
            "id_rol",
        )
        .await?;
        db::commit(txn, "roles.create").await?;

        info!(id_rol, "role created");
        Ok(id_rol)
    }

    #[instrument(skip(self))]
    pub async fn get_by_nombre(&self, nombre: &str) -> Result<RolOut, ServiceError> {
        db::query_one(
            self.db_pool.as_ref(),
            &format!("{} WHERE nombre_rol = ?", SELECT),
            vec![nombre.into()],
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Rol '{}' no encontrado", nombre)))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id_rol: i64) -> Result<RolOut, ServiceError> {
        db::query_one(
            self.db_pool.as_ref(),
            &format!("{} WHERE id_rol = ?", SELECT),
            vec![id_rol.into()],
        )
        .await?
        .ok_or_else(|| rol_no_encontrado(id_rol))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<RolOut>, ServiceError> {
        let roles: Vec<RolOut> = db::query_all(
            self.db_pool.as_ref(),
            &format!("{} ORDER BY id_rol", SELECT),
            vec![],
        )
        .await?;
        if roles.is_empty() {
            return Err(ServiceError::NotFound("No se encontraron roles".to_string()));
        }
        Ok(roles)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id_rol: i64, update: RolUpdate) -> Result<(), ServiceError> {
        let cambios = PartialUpdate::new("roles")
            .set_opt("nombre_rol", update.nombre_rol)
            .set_opt("descripcion", update.descripcion);
        if cambios.is_empty() {
            return Err(ServiceError::nothing_to_update());
        }

        let txn = self.db_pool.begin().await?;
        if cambios.execute(&txn, "id_rol", id_rol).await? == 0 {
            return Err(rol_no_encontrado(id_rol));
        }
        db::commit(txn, "roles.update").await?;

        info!(id_rol, "role updated");
        Ok(())
    }

    /// An inactive role is denied by every permission check
    #[instrument(skip(self))]
    pub async fn cambiar_estado(&self, id_rol: i64, estado: bool) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let affected = db::execute(
            &txn,
            "UPDATE roles SET estado = ? WHERE id_rol = ?",
            vec![estado.into(), id_rol.into()],
        )
        .await?;
        if affected == 0 {
            return Err(rol_no_encontrado(id_rol));
        }
        db::commit(txn, "roles.cambiar_estado").await?;

        info!(id_rol, estado, "role state changed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id_rol: i64) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        let usuarios: Option<UsuariosDelRol> = db::query_one(
            &txn,
            "SELECT CAST(COUNT(*) AS BIGINT) AS total FROM usuarios WHERE id_rol = ?",
            vec![id_rol.into()],
        )
        .await?;
        let usuarios = usuarios.map_or(0, |u| u.total);
        if usuarios > 0 {
            warn!(id_rol, usuarios, "role delete refused: still assigned");
            return Err(ServiceError::Conflict(format!(
                "El rol {} está asignado a {} usuario(s)",
                id_rol, usuarios
            )));
        }

        let affected = db::execute(&txn, "DELETE FROM roles WHERE id_rol = ?", vec![id_rol.into()])
            .await
            .map_err(|e| {
                warn!(id_rol, error = %e, "role delete refused");
                ServiceError::from(e)
            })?;
        if affected == 0 {
            return Err(rol_no_encontrado(id_rol));
        }
        db::commit(txn, "roles.delete").await?;

        info!(id_rol, "role deleted");
        Ok(())
    }
}
