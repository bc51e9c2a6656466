use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ModuloCreate {
    #[validate(length(min = 3, max = 30))]
    pub nombre_modulo: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ModuloUpdate {
    #[validate(length(min = 3, max = 30))]
    pub nombre_modulo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult, ToSchema)]
pub struct ModuloOut {
    pub id_modulo: i64,
    pub nombre_modulo: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModuloIdQuery {
    pub modulo_id: i64,
}
