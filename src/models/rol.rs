use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RolCreate {
    #[validate(length(min = 3, max = 30))]
    pub nombre_rol: String,
    #[validate(length(min = 3, max = 500))]
    pub descripcion: String,
    #[serde(default = "default_estado")]
    pub estado: bool,
}

fn default_estado() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct RolUpdate {
    #[validate(length(min = 3, max = 30))]
    pub nombre_rol: Option<String>,
    #[validate(length(min = 3, max = 500))]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct RolEstado {
    pub estado: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult, ToSchema)]
pub struct RolOut {
    pub id_rol: i64,
    pub nombre_rol: String,
    pub descripcion: String,
    pub estado: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RolIdQuery {
    pub rol_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RolNombreQuery {
    pub nombre: String,
}
