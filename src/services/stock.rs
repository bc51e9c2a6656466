use crate::db::{self, DbPool};
use crate::errors::ServiceError;
use crate::models::stock::{ProductoCreate, StockOut, StockRow, StockUpdate};
use metrics::counter;
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Product and quantity a line item holds out of stock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineaStock {
    pub id_producto: i64,
    pub cantidad: i64,
}

/// Signed change to one product's available quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovimientoStock {
    pub id_producto: i64,
    pub delta: i64,
}

/// Stock movements that take a line item from `anterior` to `nueva`.
///
/// `None` on either side means the line does not exist (create or delete). Releases
/// come before takes so a product swap never depends on the order of application.
pub fn plan_movimientos(
    anterior: Option<LineaStock>,
    nueva: Option<LineaStock>,
) -> Vec<MovimientoStock> {
    let movimientos = match (anterior, nueva) {
        (None, None) => vec![],
        (None, Some(n)) => vec![MovimientoStock {
            id_producto: n.id_producto,
            delta: -n.cantidad,
        }],
        (Some(a), None) => vec![MovimientoStock {
            id_producto: a.id_producto,
            delta: a.cantidad,
        }],
        (Some(a), Some(n)) if a.id_producto == n.id_producto => vec![MovimientoStock {
            id_producto: n.id_producto,
            delta: a.cantidad - n.cantidad,
        }],
        (Some(a), Some(n)) => vec![
            MovimientoStock {
                id_producto: a.id_producto,
                delta: a.cantidad,
            },
            MovimientoStock {
                id_producto: n.id_producto,
                delta: -n.cantidad,
            },
        ],
    };

    movimientos.into_iter().filter(|m| m.delta != 0).collect()
}

/// Applies movements with a guarded update so the counter can never go negative.
///
/// Meant to run inside the caller's transaction; any failure leaves the rollback to it.
pub async fn aplicar_movimientos<C>(
    conn: &C,
    movimientos: &[MovimientoStock],
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    for m in movimientos {
        let affected = db::execute(
            conn,
            "UPDATE stock SET cantidad_disponible = cantidad_disponible + ? \
             WHERE id_producto = ? AND cantidad_disponible + ? >= 0",
            vec![m.delta.into(), m.id_producto.into(), m.delta.into()],
        )
        .await?;

        if affected == 0 {
            warn!(id_producto = m.id_producto, delta = m.delta, "stock movement rejected");
            counter!("granja.stock.rejected_movements", 1);
            return Err(if m.delta < 0 {
                ServiceError::insufficient_stock()
            } else {
                ServiceError::BadRequest(format!(
                    "El producto {} no tiene registro de stock",
                    m.id_producto
                ))
            });
        }
    }
    Ok(())
}

const STOCK_SELECT: &str = "SELECT p.id_producto, p.nombre, p.categoria, p.estado, s.cantidad_disponible \
     FROM productos p JOIN stock s ON s.id_producto = p.id_producto";

/// Service for products and their stock counters
#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DbPool>,
}

impl StockService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates a product together with its stock row
    #[instrument(skip(self, producto), fields(nombre = %producto.nombre, categoria = %producto.categoria))]
    pub async fn create_producto(&self, producto: ProductoCreate) -> Result<StockOut, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let id_producto = db::insert_returning_id(
            &txn,
            "INSERT INTO productos (nombre, categoria, estado) VALUES (?, ?, ?) RETURNING id_producto",
            vec![
                producto.nombre.into(),
                producto.categoria.as_str().into(),
                true.into(),
            ],
            "id_producto",
        )
        .await
        .map_err(|e| {
            error!(error = %e, "failed to insert product");
            ServiceError::from(e)
        })?;

        db::execute(
            &txn,
            "INSERT INTO stock (id_producto, cantidad_disponible) VALUES (?, ?)",
            vec![id_producto.into(), producto.cantidad_disponible.into()],
        )
        .await?;

        let creado = Self::find(&txn, id_producto).await?;
        db::commit(txn, "stock.create_producto").await?;

        info!(id_producto, "product created");
        Ok(creado)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<StockOut>, ServiceError> {
        let rows: Vec<StockRow> = db::query_all(
            self.db_pool.as_ref(),
            &format!("{} ORDER BY p.id_producto", STOCK_SELECT),
            vec![],
        )
        .await?;
        rows.into_iter().map(StockOut::try_from).collect()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id_producto: i64) -> Result<StockOut, ServiceError> {
        Self::find(self.db_pool.as_ref(), id_producto).await
    }

    /// Overwrites the available quantity with an absolute count
    #[instrument(skip(self))]
    pub async fn set_cantidad(
        &self,
        id_producto: i64,
        update: StockUpdate,
    ) -> Result<StockOut, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let affected = db::execute(
            &txn,
            "UPDATE stock SET cantidad_disponible = ? WHERE id_producto = ?",
            vec![update.cantidad_disponible.into(), id_producto.into()],
        )
        .await?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Producto {} no encontrado",
                id_producto
            )));
        }

        let actualizado = Self::find(&txn, id_producto).await?;
        db::commit(txn, "stock.set_cantidad").await?;

        info!(id_producto, cantidad = update.cantidad_disponible, "stock count set");
        Ok(actualizado)
    }

    async fn find<C>(conn: &C, id_producto: i64) -> Result<StockOut, ServiceError>
    where
        C: ConnectionTrait,
    {
        let row: Option<StockRow> = db::query_one(
            conn,
            &format!("{} WHERE p.id_producto = ?", STOCK_SELECT),
            vec![id_producto.into()],
        )
        .await?;
        row.ok_or_else(|| ServiceError::NotFound(format!("Producto {} no encontrado", id_producto)))?
            .try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn linea(id_producto: i64, cantidad: i64) -> Option<LineaStock> {
        Some(LineaStock {
            id_producto,
            cantidad,
        })
    }

    fn mov(id_producto: i64, delta: i64) -> MovimientoStock {
        MovimientoStock { id_producto, delta }
    }

    #[rstest]
    #[case::create(None, linea(1, 30), vec![mov(1, -30)])]
    #[case::delete(linea(1, 30), None, vec![mov(1, 30)])]
    #[case::grow(linea(1, 30), linea(1, 45), vec![mov(1, -15)])]
    #[case::shrink(linea(1, 30), linea(1, 10), vec![mov(1, 20)])]
    #[case::unchanged(linea(1, 30), linea(1, 30), vec![])]
    #[case::swap(linea(1, 30), linea(2, 12), vec![mov(1, 30), mov(2, -12)])]
    #[case::nothing(None, None, vec![])]
    fn plans_line_changes(
        #[case] anterior: Option<LineaStock>,
        #[case] nueva: Option<LineaStock>,
        #[case] expected: Vec<MovimientoStock>,
    ) {
        assert_eq!(plan_movimientos(anterior, nueva), expected);
    }

    #[test]
    fn plan_conserves_units() {
        // Stock plus held quantity is constant: the deltas must cancel the held change.
        let anterior = linea(3, 40);
        let nueva = linea(3, 25);
        let total: i64 = plan_movimientos(anterior, nueva).iter().map(|m| m.delta).sum();
        assert_eq!(total, 40 - 25);
    }
}
