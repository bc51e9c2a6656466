use super::ventas::ensure_exists;
use crate::db::{self, DbPool, PartialUpdate};
use crate::errors::ServiceError;
use crate::models::tarea::{TareaCreate, TareaOut, TareaRow, TareaUpdate};
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tracing::{info, instrument};

const SELECT: &str =
    "SELECT id_tarea, id_usuario, descripcion, fecha_hora_init, estado, fecha_hora_fin FROM tareas";

fn cambios(update: TareaUpdate) -> PartialUpdate {
    PartialUpdate::new("tareas")
        .set_opt("descripcion", update.descripcion)
        .set_opt("estado", update.estado.map(|e| e.as_str()))
        .set_opt("fecha_hora_init", update.fecha_hora_init)
        .set_opt("fecha_hora_fin", update.fecha_hora_fin)
}

#[derive(Clone)]
pub struct TareaService {
    db_pool: Arc<DbPool>,
}

impl TareaService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TareaOut>, ServiceError> {
        let rows: Vec<TareaRow> = db::query_all(
            self.db_pool.as_ref(),
            &format!("{} ORDER BY id_tarea", SELECT),
            vec![],
        )
        .await?;
        rows.into_iter().map(TareaOut::try_from).collect()
    }

    #[instrument(skip(self, tarea), fields(id_usuario = tarea.id_usuario))]
    pub async fn create(&self, tarea: TareaCreate) -> Result<i64, ServiceError> {
        let txn = self.db_pool.begin().await?;

        ensure_exists(&txn, "usuarios", "id_usuario", tarea.id_usuario, "El usuario").await?;
        let id_tarea = db::insert_returning_id(
            &txn,
            "INSERT INTO tareas (id_usuario, descripcion, fecha_hora_init, estado, fecha_hora_fin) \
             VALUES (?, ?, ?, ?, ?) RETURNING id_tarea",
            vec![
                tarea.id_usuario.into(),
                tarea.descripcion.into(),
                tarea.fecha_hora_init.into(),
                tarea.estado.as_str().into(),
                tarea.fecha_hora_fin.into(),
            ],
            "id_tarea",
        )
        .await?;
        db::commit(txn, "tareas.create").await?;

        info!(id_tarea, "task created");
        Ok(id_tarea)
    }

    #[instrument(skip(self))]
    pub async fn list_by_usuario(&self, id_usuario: i64) -> Result<Vec<TareaOut>, ServiceError> {
        let rows: Vec<TareaRow> = db::query_all(
            self.db_pool.as_ref(),
            &format!("{} WHERE id_usuario = ? ORDER BY id_tarea", SELECT),
            vec![id_usuario.into()],
        )
        .await?;
        if rows.is_empty() {
            return Err(ServiceError::NotFound(
                "No hay tareas para este usuario".to_string(),
            ));
        }
        rows.into_iter().map(TareaOut::try_from).collect()
    }

    /// Applies the same changes to every task of a user; returns how many changed
    #[instrument(skip(self, update))]
    pub async fn update_by_usuario(&self, id_usuario: i64, update: TareaUpdate) -> Result<u64, ServiceError> {
        let cambios = cambios(update);
        if cambios.is_empty() {
            return Err(ServiceError::nothing_to_update());
        }

        let txn = self.db_pool.begin().await?;
        let affected = cambios.execute(&txn, "id_usuario", id_usuario).await?;
        if affected == 0 {
            return Err(ServiceError::NotFound(
                "No hay tareas para este usuario".to_string(),
            ));
        }
        db::commit(txn, "tareas.update_by_usuario").await?;

        info!(id_usuario, affected, "user tasks updated");
        Ok(affected)
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id_tarea: i64, update: TareaUpdate) -> Result<(), ServiceError> {
        let cambios = cambios(update);
        if cambios.is_empty() {
            return Err(ServiceError::nothing_to_update());
        }

        let txn = self.db_pool.begin().await?;
        if cambios.execute(&txn, "id_tarea", id_tarea).await? == 0 {
            return Err(ServiceError::NotFound(format!("Tarea {} no encontrada", id_tarea)));
        }
        db::commit(txn, "tareas.update").await?;

        info!(id_tarea, "task updated");
        Ok(())
    }
}
