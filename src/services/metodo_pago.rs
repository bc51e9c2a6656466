use crate::db::{self, DbPool, PartialUpdate};
use crate::errors::ServiceError;
use crate::models::metodo_pago::{MetodoPagoCreate, MetodoPagoOut, MetodoPagoUpdate};
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tracing::{info, instrument};

const SELECT: &str = "SELECT id_tipo, nombre, descripcion, estado FROM metodo_pago";

#[derive(Clone)]
pub struct MetodoPagoService {
    db_pool: Arc<DbPool>,
}

impl MetodoPagoService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, metodo: MetodoPagoCreate) -> Result<i64, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let id_tipo = db::insert_returning_id(
            &txn,
            "INSERT INTO metodo_pago (nombre, descripcion, estado) VALUES (?, ?, ?) RETURNING id_tipo",
            vec![
                metodo.nombre.into(),
                metodo.descripcion.into(),
                metodo.estado.into(),
            ],
            "id_tipo",
        )
        .await?;
        db::commit(txn, "metodo_pago.create").await?;

        info!(id_tipo, "payment method created");
        Ok(id_tipo)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id_tipo: i64) -> Result<MetodoPagoOut, ServiceError> {
        db::query_one(
            self.db_pool.as_ref(),
            &format!("{} WHERE id_tipo = ?", SELECT),
            vec![id_tipo.into()],
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Método de pago {} no encontrado", id_tipo)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<MetodoPagoOut>, ServiceError> {
        Ok(db::query_all(
            self.db_pool.as_ref(),
            &format!("{} ORDER BY id_tipo", SELECT),
            vec![],
        )
        .await?)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id_tipo: i64, update: MetodoPagoUpdate) -> Result<(), ServiceError> {
        let cambios = PartialUpdate::new("metodo_pago")
            .set_opt("nombre", update.nombre)
            .set_opt("descripcion", update.descripcion)
            .set_opt("estado", update.estado);
        if cambios.is_empty() {
            return Err(ServiceError::nothing_to_update());
        }

        let txn = self.db_pool.begin().await?;
        if cambios.execute(&txn, "id_tipo", id_tipo).await? == 0 {
            return Err(ServiceError::NotFound(format!(
                "Método de pago {} no encontrado",
                id_tipo
            )));
        }
        db::commit(txn, "metodo_pago.update").await?;

        info!(id_tipo, "payment method updated");
        Ok(())
    }
}
