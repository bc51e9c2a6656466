use super::money::from_cents;
use super::validate_id;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a sale
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct VentaCreate {
    #[validate(custom = "validate_id")]
    pub id_usuario: i64,
    pub fecha_hora: NaiveDateTime,
    #[serde(default = "default_estado")]
    pub estado: bool,
}

fn default_estado() -> bool {
    true
}

/// Partial update of a sale header
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct VentaUpdate {
    #[validate(custom = "validate_id")]
    pub id_usuario: Option<i64>,
    #[validate(custom = "validate_id")]
    pub tipo_pago: Option<i64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct VentaEstado {
    pub estado: bool,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct VentaRow {
    pub id_venta: i64,
    pub id_usuario: i64,
    pub nombre_usuario: Option<String>,
    pub tipo_pago: i64,
    pub metodo_pago: Option<String>,
    pub fecha_hora: NaiveDateTime,
    pub estado: bool,
    pub total_centavos: i64,
}

/// Sale header with its computed total
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VentaOut {
    pub id_venta: i64,
    pub id_usuario: i64,
    pub nombre_usuario: Option<String>,
    pub tipo_pago: i64,
    pub metodo_pago: Option<String>,
    pub fecha_hora: NaiveDateTime,
    pub estado: bool,
    /// Sum of `(precio_venta - valor_descuento) * cantidad` over every line
    #[schema(value_type = String, example = "12500.00")]
    pub total: Decimal,
}

impl From<VentaRow> for VentaOut {
    fn from(row: VentaRow) -> Self {
        Self {
            id_venta: row.id_venta,
            id_usuario: row.id_usuario,
            nombre_usuario: row.nombre_usuario,
            tipo_pago: row.tipo_pago,
            metodo_pago: row.metodo_pago,
            fecha_hora: row.fecha_hora,
            estado: row.estado,
            total: from_cents(row.total_centavos),
        }
    }
}

/// One page of sales
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VentaPage {
    pub page: u64,
    pub page_size: u64,
    pub total_ventas: u64,
    pub total_pages: u64,
    pub ventas: Vec<VentaOut>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VentaCreada {
    pub message: String,
    pub venta: VentaOut,
}

/// Which sales a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentaFiltro {
    Todas,
    /// Calendar dates, both ends inclusive
    PorFecha { desde: NaiveDate, hasta: NaiveDate },
    PorUsuario(i64),
    PorTipoPago(i64),
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VentaIdQuery {
    pub venta_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangoFechasQuery {
    /// First calendar day, `YYYY-MM-DD`
    pub fecha_inicio: NaiveDate,
    /// Last calendar day, inclusive
    pub fecha_fin: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsuarioQuery {
    pub id_usuario: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TipoPagoQuery {
    pub tipo_pago: i64,
}
