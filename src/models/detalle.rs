use super::money::{from_cents, validate_amount};
use super::validate_id;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Product category; each one has its own line-item table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Categoria {
    Huevos,
    Salvamento,
}

impl Categoria {
    pub const ALL: [Categoria; 2] = [Categoria::Huevos, Categoria::Salvamento];

    pub fn as_str(&self) -> &'static str {
        match self {
            Categoria::Huevos => "huevos",
            Categoria::Salvamento => "salvamento",
        }
    }

    /// Line-item table for this category
    pub fn table(&self) -> &'static str {
        match self {
            Categoria::Huevos => "detalle_huevos",
            Categoria::Salvamento => "detalle_salvamento",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Categoria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn validate_cantidad(cantidad: i64) -> Result<(), ValidationError> {
    if cantidad > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("cantidad");
        err.message = Some("La cantidad debe ser mayor a cero".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[validate(schema(function = "validate_descuento_create"))]
pub struct DetalleCreate {
    #[validate(custom = "validate_id")]
    pub id_producto: i64,
    #[validate(custom = "validate_cantidad")]
    pub cantidad: i64,
    #[validate(custom = "validate_id")]
    pub id_venta: i64,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    #[schema(value_type = String, example = "0.00")]
    pub valor_descuento: Decimal,
    #[validate(custom = "validate_amount")]
    #[schema(value_type = String, example = "2500.00")]
    pub precio_venta: Decimal,
}

fn validate_descuento_create(detalle: &DetalleCreate) -> Result<(), ValidationError> {
    validate_descuento(detalle.valor_descuento, detalle.precio_venta)
}

/// The discount is per unit and cannot exceed the unit price.
pub(crate) fn validate_descuento(descuento: Decimal, precio: Decimal) -> Result<(), ValidationError> {
    if descuento <= precio {
        Ok(())
    } else {
        let mut err = ValidationError::new("valor_descuento");
        err.message = Some("El descuento no puede superar el precio de venta".into());
        Err(err)
    }
}

/// Partial update of a line item
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct DetalleUpdate {
    #[validate(custom = "validate_id")]
    pub id_producto: Option<i64>,
    #[validate(custom = "validate_cantidad")]
    pub cantidad: Option<i64>,
    #[validate(custom = "validate_amount")]
    #[schema(value_type = Option<String>)]
    pub valor_descuento: Option<Decimal>,
    #[validate(custom = "validate_amount")]
    #[schema(value_type = Option<String>)]
    pub precio_venta: Option<Decimal>,
}

impl DetalleUpdate {
    pub fn is_empty(&self) -> bool {
        self.id_producto.is_none()
            && self.cantidad.is_none()
            && self.valor_descuento.is_none()
            && self.precio_venta.is_none()
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct DetalleRow {
    pub id_detalle: i64,
    pub id_producto: i64,
    pub cantidad: i64,
    pub id_venta: i64,
    pub valor_descuento: i64,
    pub precio_venta: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetalleOut {
    pub id_detalle: i64,
    pub id_producto: i64,
    pub cantidad: i64,
    pub id_venta: i64,
    #[schema(value_type = String)]
    pub valor_descuento: Decimal,
    #[schema(value_type = String)]
    pub precio_venta: Decimal,
}

impl From<DetalleRow> for DetalleOut {
    fn from(row: DetalleRow) -> Self {
        Self {
            id_detalle: row.id_detalle,
            id_producto: row.id_producto,
            cantidad: row.cantidad,
            id_venta: row.id_venta,
            valor_descuento: from_cents(row.valor_descuento),
            precio_venta: from_cents(row.precio_venta),
        }
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct DetalleConVentaRow {
    pub id_detalle: i64,
    pub id_producto: i64,
    pub cantidad: i64,
    pub id_venta: i64,
    pub valor_descuento: i64,
    pub precio_venta: i64,
    pub fecha_hora: NaiveDateTime,
    pub estado: bool,
}

/// A line item together with its sale header date and state
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetalleConVentaOut {
    pub id_detalle: i64,
    pub id_producto: i64,
    pub cantidad: i64,
    pub id_venta: i64,
    #[schema(value_type = String)]
    pub valor_descuento: Decimal,
    #[schema(value_type = String)]
    pub precio_venta: Decimal,
    pub fecha_hora: NaiveDateTime,
    pub estado: bool,
}

impl From<DetalleConVentaRow> for DetalleConVentaOut {
    fn from(row: DetalleConVentaRow) -> Self {
        Self {
            id_detalle: row.id_detalle,
            id_producto: row.id_producto,
            cantidad: row.cantidad,
            id_venta: row.id_venta,
            valor_descuento: from_cents(row.valor_descuento),
            precio_venta: from_cents(row.precio_venta),
            fecha_hora: row.fecha_hora,
            estado: row.estado,
        }
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct DetalleVentaRow {
    pub tipo: String,
    pub id_detalle: i64,
    pub id_producto: i64,
    pub cantidad: i64,
    pub id_venta: i64,
    pub valor_descuento: i64,
    pub precio_venta: i64,
    pub subtotal_centavos: i64,
}

/// Line item of either category, as listed under a sale
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetalleVentaOut {
    pub tipo: String,
    pub id_detalle: i64,
    pub id_producto: i64,
    pub cantidad: i64,
    pub id_venta: i64,
    #[schema(value_type = String)]
    pub valor_descuento: Decimal,
    #[schema(value_type = String)]
    pub precio_venta: Decimal,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
}

impl From<DetalleVentaRow> for DetalleVentaOut {
    fn from(row: DetalleVentaRow) -> Self {
        Self {
            tipo: row.tipo,
            id_detalle: row.id_detalle,
            id_producto: row.id_producto,
            cantidad: row.cantidad,
            id_venta: row.id_venta,
            valor_descuento: from_cents(row.valor_descuento),
            precio_venta: from_cents(row.precio_venta),
            subtotal: from_cents(row.subtotal_centavos),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DetalleIdQuery {
    pub detalle_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn detalle(cantidad: i64, descuento: Decimal, precio: Decimal) -> DetalleCreate {
        DetalleCreate {
            id_producto: 1,
            cantidad,
            id_venta: 1,
            valor_descuento: descuento,
            precio_venta: precio,
        }
    }

    #[test]
    fn valid_line_passes() {
        assert!(detalle(30, dec!(100), dec!(2500.50)).validate().is_ok());
    }

    #[test]
    fn zero_quantity_fails() {
        assert!(detalle(0, dec!(0), dec!(2500)).validate().is_err());
    }

    #[test]
    fn discount_above_price_fails() {
        assert!(detalle(1, dec!(3000), dec!(2500)).validate().is_err());
    }

    #[test]
    fn three_decimals_fail() {
        assert!(detalle(1, dec!(0), dec!(10.999)).validate().is_err());
    }

    #[test]
    fn categoria_round_trips_through_its_name() {
        for categoria in Categoria::ALL {
            assert_eq!(Categoria::parse(categoria.as_str()), Some(categoria));
        }
        assert_eq!(Categoria::parse("lacteos"), None);
        assert_eq!(Categoria::Salvamento.table(), "detalle_salvamento");
    }

    #[test]
    fn optional_fields_are_validated_when_present() {
        let update = DetalleUpdate {
            cantidad: Some(0),
            id_producto: Some(-4),
            ..Default::default()
        };
        let errors = update.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cantidad"));
        assert!(errors.field_errors().contains_key("id_producto"));
        assert!(DetalleUpdate::default().validate().is_ok());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(DetalleUpdate::default().is_empty());
        let update = DetalleUpdate {
            cantidad: Some(3),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
