use super::detalle::Categoria;
use crate::errors::ServiceError;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

fn validate_cantidad_disponible(cantidad: i64) -> Result<(), ValidationError> {
    if cantidad >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("cantidad_disponible");
        err.message = Some("La cantidad disponible no puede ser negativa".into());
        Err(err)
    }
}

/// New product with its opening stock
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProductoCreate {
    #[validate(length(min = 2, max = 100))]
    pub nombre: String,
    pub categoria: Categoria,
    #[serde(default)]
    #[validate(custom = "validate_cantidad_disponible")]
    pub cantidad_disponible: i64,
}

/// Absolute stock count (production intake or physical count)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate, ToSchema)]
pub struct StockUpdate {
    #[validate(custom = "validate_cantidad_disponible")]
    pub cantidad_disponible: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct StockRow {
    pub id_producto: i64,
    pub nombre: String,
    pub categoria: String,
    pub estado: bool,
    pub cantidad_disponible: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockOut {
    pub id_producto: i64,
    pub nombre: String,
    pub categoria: Categoria,
    pub estado: bool,
    pub cantidad_disponible: i64,
}

impl TryFrom<StockRow> for StockOut {
    type Error = ServiceError;

    fn try_from(row: StockRow) -> Result<Self, Self::Error> {
        let categoria = Categoria::parse(&row.categoria).ok_or_else(|| {
            ServiceError::InternalError(format!(
                "producto {} con categoría desconocida '{}'",
                row.id_producto, row.categoria
            ))
        })?;
        Ok(Self {
            id_producto: row.id_producto,
            nombre: row.nombre,
            categoria,
            estado: row.estado,
            cantidad_disponible: row.cantidad_disponible,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductoIdQuery {
    pub producto_id: i64,
}
