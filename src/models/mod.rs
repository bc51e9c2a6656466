//! Request bodies, query parameters, row mappings and response shapes.

pub mod detalle;
pub mod metodo_pago;
pub mod modulo;
pub mod money;
pub mod pagination;
pub mod permiso;
pub mod rol;
pub mod stock;
pub mod tarea;
pub mod venta;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

pub use detalle::Categoria;
pub use pagination::{PageRequest, PaginationParams};

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn validate_id(id: i64) -> Result<(), ValidationError> {
    if id > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("id");
        err.message = Some("El identificador debe ser positivo".into());
        Err(err)
    }
}
