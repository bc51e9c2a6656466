use super::stock::{aplicar_movimientos, plan_movimientos, LineaStock};
use super::ventas::estado_venta;
use crate::db::{self, DbPool, PartialUpdate};
use crate::errors::ServiceError;
use crate::models::detalle::{
    validate_descuento, Categoria, DetalleConVentaOut, DetalleConVentaRow, DetalleCreate,
    DetalleOut, DetalleRow, DetalleUpdate,
};
use crate::models::money::{from_cents, to_cents};
use sea_orm::{ConnectionTrait, FromQueryResult, TransactionTrait};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Debug, FromQueryResult)]
struct ProductoCategoria {
    categoria: String,
}

/// Line items of one category. Every mutation moves stock in the same transaction.
#[derive(Clone)]
pub struct DetalleService {
    db_pool: Arc<DbPool>,
    categoria: Categoria,
}

impl DetalleService {
    pub fn new(db_pool: Arc<DbPool>, categoria: Categoria) -> Self {
        Self { db_pool, categoria }
    }

    pub fn categoria(&self) -> Categoria {
        self.categoria
    }

    fn table(&self) -> &'static str {
        self.categoria.table()
    }

    #[instrument(skip(self, detalle), fields(categoria = %self.categoria, id_venta = detalle.id_venta))]
    pub async fn create(&self, detalle: DetalleCreate) -> Result<DetalleOut, ServiceError> {
        let precio_venta = to_cents(detalle.precio_venta)?;
        let valor_descuento = to_cents(detalle.valor_descuento)?;

        let txn = self.db_pool.begin().await?;

        self.ensure_venta_activa(&txn, detalle.id_venta).await?;
        self.ensure_categoria(&txn, detalle.id_producto).await?;

        let movimientos = plan_movimientos(
            None,
            Some(LineaStock {
                id_producto: detalle.id_producto,
                cantidad: detalle.cantidad,
            }),
        );
        aplicar_movimientos(&txn, &movimientos).await?;

        let id_detalle = db::insert_returning_id(
            &txn,
            &format!(
                "INSERT INTO {} (id_producto, cantidad, id_venta, valor_descuento, precio_venta) \
                 VALUES (?, ?, ?, ?, ?) RETURNING id_detalle",
                self.table()
            ),
            vec![
                detalle.id_producto.into(),
                detalle.cantidad.into(),
                detalle.id_venta.into(),
                valor_descuento.into(),
                precio_venta.into(),
            ],
            "id_detalle",
        )
        .await
        .map_err(|e| {
            error!(error = %e, "failed to insert line item");
            ServiceError::from(e)
        })?;

        let creado = self.find(&txn, id_detalle).await?;
        db::commit(txn, "detalle.create").await?;

        info!(id_detalle, cantidad = detalle.cantidad, "line item created");
        Ok(creado.into())
    }

    #[instrument(skip(self), fields(categoria = %self.categoria))]
    pub async fn get(&self, id_detalle: i64) -> Result<DetalleOut, ServiceError> {
        Ok(self.find(self.db_pool.as_ref(), id_detalle).await?.into())
    }

    /// Lines of one sale with the header's date and state
    #[instrument(skip(self), fields(categoria = %self.categoria))]
    pub async fn list_by_venta(&self, id_venta: i64) -> Result<Vec<DetalleConVentaOut>, ServiceError> {
        let conn = self.db_pool.as_ref();
        if estado_venta(conn, id_venta).await?.is_none() {
            return Err(ServiceError::NotFound("Venta no encontrada".to_string()));
        }

        let rows: Vec<DetalleConVentaRow> = db::query_all(
            conn,
            &format!(
                "SELECT d.id_detalle, d.id_producto, d.cantidad, d.id_venta, d.valor_descuento, d.precio_venta, \
                 v.fecha_hora, v.estado \
                 FROM {} d JOIN ventas v ON v.id_venta = d.id_venta \
                 WHERE d.id_venta = ? ORDER BY d.id_detalle",
                self.table()
            ),
            vec![id_venta.into()],
        )
        .await?;
        Ok(rows.into_iter().map(DetalleConVentaOut::from).collect())
    }

    #[instrument(skip(self, update), fields(categoria = %self.categoria))]
    pub async fn update(&self, id_detalle: i64, update: DetalleUpdate) -> Result<DetalleOut, ServiceError> {
        if update.is_empty() {
            return Err(ServiceError::nothing_to_update());
        }
        let precio_venta = update.precio_venta.map(to_cents).transpose()?;
        let valor_descuento = update.valor_descuento.map(to_cents).transpose()?;

        let txn = self.db_pool.begin().await?;

        let anterior = self.find(&txn, id_detalle).await?;
        self.ensure_venta_activa(&txn, anterior.id_venta).await?;

        let id_producto = update.id_producto.unwrap_or(anterior.id_producto);
        let cantidad = update.cantidad.unwrap_or(anterior.cantidad);
        let precio = precio_venta.unwrap_or(anterior.precio_venta);
        let descuento = valor_descuento.unwrap_or(anterior.valor_descuento);
        validate_descuento(from_cents(descuento), from_cents(precio))
            .map_err(|e| {
                ServiceError::ValidationError(
                    e.message.map_or_else(|| e.code.to_string(), |m| m.to_string()),
                )
            })?;

        if id_producto != anterior.id_producto {
            self.ensure_categoria(&txn, id_producto).await?;
        }

        let movimientos = plan_movimientos(
            Some(LineaStock {
                id_producto: anterior.id_producto,
                cantidad: anterior.cantidad,
            }),
            Some(LineaStock {
                id_producto,
                cantidad,
            }),
        );
        aplicar_movimientos(&txn, &movimientos).await?;

        PartialUpdate::new(self.table())
            .set_opt("id_producto", update.id_producto)
            .set_opt("cantidad", update.cantidad)
            .set_opt("valor_descuento", valor_descuento)
            .set_opt("precio_venta", precio_venta)
            .execute(&txn, "id_detalle", id_detalle)
            .await?;

        let actualizado = self.find(&txn, id_detalle).await?;
        db::commit(txn, "detalle.update").await?;

        info!(id_detalle, movimientos = movimientos.len(), "line item updated");
        Ok(actualizado.into())
    }

    /// Removes a line and gives its quantity back to stock
    #[instrument(skip(self), fields(categoria = %self.categoria))]
    pub async fn delete(&self, id_detalle: i64) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let anterior = self.find(&txn, id_detalle).await?;
        let movimientos = plan_movimientos(
            Some(LineaStock {
                id_producto: anterior.id_producto,
                cantidad: anterior.cantidad,
            }),
            None,
        );
        aplicar_movimientos(&txn, &movimientos).await?;

        db::execute(
            &txn,
            &format!("DELETE FROM {} WHERE id_detalle = ?", self.table()),
            vec![id_detalle.into()],
        )
        .await?;

        db::commit(txn, "detalle.delete").await?;
        info!(id_detalle, "line item deleted");
        Ok(())
    }

    async fn find<C>(&self, conn: &C, id_detalle: i64) -> Result<DetalleRow, ServiceError>
    where
        C: ConnectionTrait,
    {
        let row: Option<DetalleRow> = db::query_one(
            conn,
            &format!(
                "SELECT id_detalle, id_producto, cantidad, id_venta, valor_descuento, precio_venta \
                 FROM {} WHERE id_detalle = ?",
                self.table()
            ),
            vec![id_detalle.into()],
        )
        .await?;
        row.ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Detalle de {} {} no encontrado",
                self.categoria, id_detalle
            ))
        })
    }

    async fn ensure_venta_activa<C>(&self, conn: &C, id_venta: i64) -> Result<(), ServiceError>
    where
        C: ConnectionTrait,
    {
        match estado_venta(conn, id_venta).await? {
            None => Err(ServiceError::NotFound("Venta no encontrada".to_string())),
            Some(false) => Err(ServiceError::InvalidOperation(format!(
                "La venta {} está cancelada",
                id_venta
            ))),
            Some(true) => Ok(()),
        }
    }

    async fn ensure_categoria<C>(&self, conn: &C, id_producto: i64) -> Result<(), ServiceError>
    where
        C: ConnectionTrait,
    {
        let producto: Option<ProductoCategoria> = db::query_one(
            conn,
            "SELECT categoria FROM productos WHERE id_producto = ?",
            vec![id_producto.into()],
        )
        .await?;

        match producto {
            None => Err(ServiceError::BadRequest(format!(
                "El producto {} no existe",
                id_producto
            ))),
            Some(p) if p.categoria != self.categoria.as_str() => Err(ServiceError::BadRequest(format!(
                "El producto {} no pertenece a la categoría {}",
                id_producto, self.categoria
            ))),
            Some(_) => Ok(()),
        }
    }
}
