use super::validate_id;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Full permission row for one role and module
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PermisoAsignar {
    #[validate(custom = "validate_id")]
    pub id_rol: i64,
    #[validate(custom = "validate_id")]
    pub id_modulo: i64,
    #[serde(default)]
    pub insertar: bool,
    #[serde(default)]
    pub actualizar: bool,
    #[serde(default)]
    pub seleccionar: bool,
    #[serde(default)]
    pub borrar: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult, ToSchema)]
pub struct PermisoOut {
    pub id_rol: i64,
    pub id_modulo: i64,
    pub nombre_modulo: String,
    pub insertar: bool,
    pub actualizar: bool,
    pub seleccionar: bool,
    pub borrar: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermisoRolQuery {
    pub rol_id: i64,
}
