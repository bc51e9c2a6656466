use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct MetodoPagoCreate {
    #[validate(length(min = 3, max = 30))]
    pub nombre: String,
    #[validate(length(min = 3, max = 500))]
    pub descripcion: String,
    #[serde(default = "default_estado")]
    pub estado: bool,
}

fn default_estado() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct MetodoPagoUpdate {
    #[validate(length(min = 3, max = 30))]
    pub nombre: Option<String>,
    #[validate(length(min = 3, max = 500))]
    pub descripcion: Option<String>,
    pub estado: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult, ToSchema)]
pub struct MetodoPagoOut {
    pub id_tipo: i64,
    pub nombre: String,
    pub descripcion: String,
    pub estado: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MetodoPagoIdQuery {
    pub metodo_pago_id: i64,
}
