use crate::db::{self, DbPool, PartialUpdate};
use crate::errors::ServiceError;
use crate::models::detalle::{Categoria, DetalleVentaOut, DetalleVentaRow};
use crate::models::pagination::PageRequest;
use crate::models::venta::{VentaCreate, VentaFiltro, VentaOut, VentaPage, VentaRow, VentaUpdate};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use metrics::counter;
use sea_orm::{ConnectionTrait, FromQueryResult, TransactionTrait, Value};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Sale header plus its total, computed from both line-item tables.
pub(crate) const VENTA_SELECT: &str = "SELECT v.id_venta, v.id_usuario, u.nombre AS nombre_usuario, \
     v.tipo_pago, mp.nombre AS metodo_pago, v.fecha_hora, v.estado, \
     CAST(COALESCE((SELECT SUM((dh.precio_venta - dh.valor_descuento) * dh.cantidad) \
                    FROM detalle_huevos dh WHERE dh.id_venta = v.id_venta), 0) \
        + COALESCE((SELECT SUM((ds.precio_venta - ds.valor_descuento) * ds.cantidad) \
                    FROM detalle_salvamento ds WHERE ds.id_venta = v.id_venta), 0) AS BIGINT) AS total_centavos \
     FROM ventas v \
     LEFT JOIN usuarios u ON u.id_usuario = v.id_usuario \
     LEFT JOIN metodo_pago mp ON mp.id_tipo = v.tipo_pago";

#[derive(Debug, FromQueryResult)]
struct EstadoVenta {
    estado: bool,
}

#[derive(Debug, FromQueryResult)]
struct Conteo {
    total: i64,
}

/// Looks up a sale's active flag; `None` when the sale does not exist.
pub(crate) async fn estado_venta<C>(conn: &C, id_venta: i64) -> Result<Option<bool>, ServiceError>
where
    C: ConnectionTrait,
{
    let row: Option<EstadoVenta> = db::query_one(
        conn,
        "SELECT estado FROM ventas WHERE id_venta = ?",
        vec![id_venta.into()],
    )
    .await?;
    Ok(row.map(|r| r.estado))
}

fn venta_no_encontrada() -> ServiceError {
    ServiceError::NotFound("Venta no encontrada".to_string())
}

fn inicio_del_dia(fecha: NaiveDate) -> NaiveDateTime {
    fecha.and_time(NaiveTime::MIN)
}

impl VentaFiltro {
    /// WHERE clause, its bound values and the ORDER BY for this filter
    fn sql(&self) -> (&'static str, Vec<Value>, &'static str) {
        match *self {
            VentaFiltro::Todas => ("", vec![], "v.id_venta ASC"),
            VentaFiltro::PorFecha { desde, hasta } => match hasta.succ_opt() {
                Some(siguiente) => (
                    " WHERE v.fecha_hora >= ? AND v.fecha_hora < ?",
                    vec![
                        inicio_del_dia(desde).into(),
                        inicio_del_dia(siguiente).into(),
                    ],
                    "v.fecha_hora ASC, v.id_venta ASC",
                ),
                // Last representable day: nothing lies beyond it.
                None => (
                    " WHERE v.fecha_hora >= ?",
                    vec![inicio_del_dia(desde).into()],
                    "v.fecha_hora ASC, v.id_venta ASC",
                ),
            },
            VentaFiltro::PorUsuario(id_usuario) => (
                " WHERE v.id_usuario = ?",
                vec![id_usuario.into()],
                "v.id_venta ASC",
            ),
            VentaFiltro::PorTipoPago(tipo_pago) => (
                " WHERE v.tipo_pago = ?",
                vec![tipo_pago.into()],
                "v.id_venta ASC",
            ),
        }
    }
}

/// Service for sale headers
#[derive(Clone)]
pub struct VentaService {
    db_pool: Arc<DbPool>,
    default_metodo_pago_id: i64,
}

impl VentaService {
    pub fn new(db_pool: Arc<DbPool>, default_metodo_pago_id: i64) -> Self {
        Self {
            db_pool,
            default_metodo_pago_id,
        }
    }

    /// Creates a sale paid with the default payment method
    #[instrument(skip(self))]
    pub async fn create(&self, venta: VentaCreate) -> Result<VentaOut, ServiceError> {
        let txn = self.db_pool.begin().await?;

        ensure_exists(&txn, "usuarios", "id_usuario", venta.id_usuario, "El usuario").await?;

        let id_venta = db::insert_returning_id(
            &txn,
            "INSERT INTO ventas (id_usuario, tipo_pago, fecha_hora, estado) VALUES (?, ?, ?, ?) RETURNING id_venta",
            vec![
                venta.id_usuario.into(),
                self.default_metodo_pago_id.into(),
                venta.fecha_hora.into(),
                venta.estado.into(),
            ],
            "id_venta",
        )
        .await
        .map_err(|e| {
            error!(error = %e, "failed to insert sale");
            ServiceError::from(e)
        })?;

        let creada = Self::find(&txn, id_venta).await?;
        db::commit(txn, "ventas.create").await?;

        counter!("granja.ventas.created", 1);
        info!(id_venta, "sale created");
        Ok(creada)
    }

    /// Paginated listing; the total count honours the same filter
    #[instrument(skip(self))]
    pub async fn list(&self, filtro: VentaFiltro, page: PageRequest) -> Result<VentaPage, ServiceError> {
        let conn = self.db_pool.as_ref();
        let (where_sql, values, order_by) = filtro.sql();

        let conteo: Option<Conteo> = db::query_one(
            conn,
            &format!("SELECT CAST(COUNT(*) AS BIGINT) AS total FROM ventas v{}", where_sql),
            values.clone(),
        )
        .await?;
        let total_ventas = conteo.map_or(0, |c| c.total.max(0) as u64);

        let (limit, offset) = page.limit_offset()?;
        let mut page_values = values;
        page_values.push(limit.into());
        page_values.push(offset.into());
        let rows: Vec<VentaRow> = db::query_all(
            conn,
            &format!("{}{} ORDER BY {} LIMIT ? OFFSET ?", VENTA_SELECT, where_sql, order_by),
            page_values,
        )
        .await?;

        Ok(VentaPage {
            page: page.page,
            page_size: page.page_size,
            total_ventas,
            total_pages: page.total_pages(total_ventas),
            ventas: rows.into_iter().map(VentaOut::from).collect(),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id_venta: i64) -> Result<VentaOut, ServiceError> {
        Self::find(self.db_pool.as_ref(), id_venta).await
    }

    /// Partial update of an active sale's user and payment method
    #[instrument(skip(self))]
    pub async fn update(&self, id_venta: i64, update: VentaUpdate) -> Result<(), ServiceError> {
        let cambios = PartialUpdate::new("ventas")
            .set_opt("id_usuario", update.id_usuario)
            .set_opt("tipo_pago", update.tipo_pago);
        if cambios.is_empty() {
            return Err(ServiceError::nothing_to_update());
        }

        let txn = self.db_pool.begin().await?;

        match estado_venta(&txn, id_venta).await? {
            None => return Err(venta_no_encontrada()),
            Some(false) => {
                return Err(ServiceError::InvalidOperation(format!(
                    "La venta {} ya está cancelada, no se puede actualizar",
                    id_venta
                )))
            }
            Some(true) => {}
        }
        if let Some(id_usuario) = update.id_usuario {
            ensure_exists(&txn, "usuarios", "id_usuario", id_usuario, "El usuario").await?;
        }
        if let Some(tipo_pago) = update.tipo_pago {
            ensure_exists(&txn, "metodo_pago", "id_tipo", tipo_pago, "El método de pago").await?;
        }

        cambios.execute(&txn, "id_venta", id_venta).await?;
        db::commit(txn, "ventas.update").await?;

        info!(id_venta, "sale updated");
        Ok(())
    }

    /// Applies a state change; returns `true` when the sale was cancelled by this call.
    ///
    /// Cancelling gives every line's quantity back to stock and removes the lines.
    #[instrument(skip(self))]
    pub async fn cambiar_estado(&self, id_venta: i64, estado: bool) -> Result<bool, ServiceError> {
        let txn = self.db_pool.begin().await?;

        match estado_venta(&txn, id_venta).await? {
            None => return Err(venta_no_encontrada()),
            Some(false) => {
                return Err(ServiceError::InvalidOperation(format!(
                    "La venta {} ya está cancelada, no se puede actualizar",
                    id_venta
                )))
            }
            Some(true) if estado => {
                info!(id_venta, "sale already active, nothing to do");
                return Ok(false);
            }
            Some(true) => {}
        }

        db::execute(
            &txn,
            "UPDATE ventas SET estado = ? WHERE id_venta = ?",
            vec![false.into(), id_venta.into()],
        )
        .await?;

        let mut lineas_borradas = 0;
        for categoria in Categoria::ALL {
            let tabla = categoria.table();
            db::execute(
                &txn,
                &format!(
                    "UPDATE stock SET cantidad_disponible = cantidad_disponible + \
                     (SELECT COALESCE(SUM(d.cantidad), 0) FROM {tabla} d \
                      WHERE d.id_venta = ? AND d.id_producto = stock.id_producto) \
                     WHERE id_producto IN (SELECT id_producto FROM {tabla} WHERE id_venta = ?)"
                ),
                vec![id_venta.into(), id_venta.into()],
            )
            .await
            .map_err(|e| {
                error!(error = %e, tabla, "failed to restore stock on cancellation");
                ServiceError::from(e)
            })?;

            lineas_borradas += db::execute(
                &txn,
                &format!("DELETE FROM {} WHERE id_venta = ?", tabla),
                vec![id_venta.into()],
            )
            .await?;
        }

        db::commit(txn, "ventas.cancelar").await?;

        counter!("granja.ventas.cancelled", 1);
        info!(id_venta, lineas_borradas, "sale cancelled");
        Ok(true)
    }

    /// Deletes a cancelled sale
    #[instrument(skip(self))]
    pub async fn delete(&self, id_venta: i64) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        match estado_venta(&txn, id_venta).await? {
            None => return Err(venta_no_encontrada()),
            Some(true) => {
                return Err(ServiceError::InvalidOperation(
                    "Solo se pueden eliminar ventas canceladas".to_string(),
                ))
            }
            Some(false) => {}
        }

        for categoria in Categoria::ALL {
            db::execute(
                &txn,
                &format!("DELETE FROM {} WHERE id_venta = ?", categoria.table()),
                vec![id_venta.into()],
            )
            .await?;
        }
        db::execute(
            &txn,
            "DELETE FROM ventas WHERE id_venta = ?",
            vec![id_venta.into()],
        )
        .await?;

        db::commit(txn, "ventas.delete").await?;
        info!(id_venta, "sale deleted");
        Ok(())
    }

    /// Every line item of a sale, eggs first
    #[instrument(skip(self))]
    pub async fn detalles(&self, id_venta: i64) -> Result<Vec<DetalleVentaOut>, ServiceError> {
        let conn = self.db_pool.as_ref();
        if estado_venta(conn, id_venta).await?.is_none() {
            return Err(venta_no_encontrada());
        }

        let select = |categoria: Categoria| {
            format!(
                "SELECT '{}' AS tipo, id_detalle, id_producto, cantidad, id_venta, valor_descuento, precio_venta, \
                 (precio_venta - valor_descuento) * cantidad AS subtotal_centavos \
                 FROM {} WHERE id_venta = ?",
                categoria.as_str(),
                categoria.table()
            )
        };
        let sql = format!(
            "SELECT * FROM ({} UNION ALL {}) lineas ORDER BY tipo, id_detalle",
            select(Categoria::Huevos),
            select(Categoria::Salvamento)
        );

        let rows: Vec<DetalleVentaRow> =
            db::query_all(conn, &sql, vec![id_venta.into(), id_venta.into()]).await?;
        Ok(rows.into_iter().map(DetalleVentaOut::from).collect())
    }

    async fn find<C>(conn: &C, id_venta: i64) -> Result<VentaOut, ServiceError>
    where
        C: ConnectionTrait,
    {
        let row: Option<VentaRow> = db::query_one(
            conn,
            &format!("{} WHERE v.id_venta = ?", VENTA_SELECT),
            vec![id_venta.into()],
        )
        .await?;
        row.map(VentaOut::from).ok_or_else(venta_no_encontrada)
    }
}

/// 400 unless `table.column = id` matches a row. Table and column come from code only.
pub(crate) async fn ensure_exists<C>(
    conn: &C,
    table: &'static str,
    column: &'static str,
    id: i64,
    etiqueta: &str,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let conteo: Option<Conteo> = db::query_one(
        conn,
        &format!(
            "SELECT CAST(COUNT(*) AS BIGINT) AS total FROM {} WHERE {} = ?",
            table, column
        ),
        vec![id.into()],
    )
    .await?;
    if conteo.map_or(0, |c| c.total) == 0 {
        return Err(ServiceError::BadRequest(format!("{} {} no existe", etiqueta, id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_is_inclusive_of_the_last_day() {
        let filtro = VentaFiltro::PorFecha {
            desde: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            hasta: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        };
        let (where_sql, values, order_by) = filtro.sql();
        assert!(where_sql.contains("v.fecha_hora < ?"));
        assert_eq!(order_by, "v.fecha_hora ASC, v.id_venta ASC");
        assert_eq!(
            values[1],
            Value::from(
                NaiveDate::from_ymd_opt(2024, 6, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn range_ending_on_the_last_date_keeps_only_the_lower_bound() {
        let filtro = VentaFiltro::PorFecha {
            desde: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            hasta: NaiveDate::MAX,
        };
        let (where_sql, values, _) = filtro.sql();
        assert_eq!(where_sql, " WHERE v.fecha_hora >= ?");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn unfiltered_listing_has_no_where_clause() {
        let (where_sql, values, _) = VentaFiltro::Todas.sql();
        assert!(where_sql.is_empty());
        assert!(values.is_empty());
    }
}
