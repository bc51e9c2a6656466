use crate::db::{self, DbPool, PartialUpdate};
use crate::errors::ServiceError;
use crate::models::modulo::{ModuloCreate, ModuloOut, ModuloUpdate};
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tracing::{info, instrument};

fn modulo_no_encontrado(id_modulo: i64) -> ServiceError {
    ServiceError::NotFound(format!("Módulo {} no encontrado", id_modulo))
}

#[derive(Clone)]
pub struct ModuloService {
    db_pool: Arc<DbPool>,
}

impl ModuloService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, modulo: ModuloCreate) -> Result<ModuloOut, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let id_modulo = db::insert_returning_id(
            &txn,
            "INSERT INTO modulos (nombre_modulo) VALUES (?) RETURNING id_modulo",
            vec![modulo.nombre_modulo.clone().into()],
            "id_modulo",
        )
        .await?;
        db::commit(txn, "modulos.create").await?;

        info!(id_modulo, "module created");
        Ok(ModuloOut {
            id_modulo,
            nombre_modulo: modulo.nombre_modulo,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id_modulo: i64) -> Result<ModuloOut, ServiceError> {
        db::query_one(
            self.db_pool.as_ref(),
            "SELECT id_modulo, nombre_modulo FROM modulos WHERE id_modulo = ?",
            vec![id_modulo.into()],
        )
        .await?
        .ok_or_else(|| modulo_no_encontrado(id_modulo))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ModuloOut>, ServiceError> {
        Ok(db::query_all(
            self.db_pool.as_ref(),
            "SELECT id_modulo, nombre_modulo FROM modulos ORDER BY id_modulo",
            vec![],
        )
        .await?)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id_modulo: i64, update: ModuloUpdate) -> Result<(), ServiceError> {
        let cambios = PartialUpdate::new("modulos").set_opt("nombre_modulo", update.nombre_modulo);
        if cambios.is_empty() {
            return Err(ServiceError::nothing_to_update());
        }

        let txn = self.db_pool.begin().await?;
        if cambios.execute(&txn, "id_modulo", id_modulo).await? == 0 {
            return Err(modulo_no_encontrado(id_modulo));
        }
        db::commit(txn, "modulos.update").await?;

        info!(id_modulo, "module renamed");
        Ok(())
    }

    /// Permission rows for the module go with it
    #[instrument(skip(self))]
    pub async fn delete(&self, id_modulo: i64) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        db::execute(
            &txn,
            "DELETE FROM permisos WHERE id_modulo = ?",
            vec![id_modulo.into()],
        )
        .await?;
        let affected = db::execute(
            &txn,
            "DELETE FROM modulos WHERE id_modulo = ?",
            vec![id_modulo.into()],
        )
        .await?;
        if affected == 0 {
            return Err(modulo_no_encontrado(id_modulo));
        }
        db::commit(txn, "modulos.delete").await?;

        info!(id_modulo, "module deleted");
        Ok(())
    }
}
