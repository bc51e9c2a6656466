use super::validate_id;
use crate::errors::ServiceError;
use chrono::NaiveDateTime;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TareaEstado {
    #[default]
    Pendiente,
    EnProceso,
    Completada,
    Cancelada,
}

impl TareaEstado {
    pub fn as_str(&self) -> &'static str {
        match self {
            TareaEstado::Pendiente => "pendiente",
            TareaEstado::EnProceso => "en_proceso",
            TareaEstado::Completada => "completada",
            TareaEstado::Cancelada => "cancelada",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            TareaEstado::Pendiente,
            TareaEstado::EnProceso,
            TareaEstado::Completada,
            TareaEstado::Cancelada,
        ]
        .into_iter()
        .find(|e| e.as_str() == value)
    }
}

fn validate_rango(
    init: Option<&NaiveDateTime>,
    fin: Option<&NaiveDateTime>,
) -> Result<(), ValidationError> {
    match (init, fin) {
        (Some(init), Some(fin)) if fin < init => {
            let mut err = ValidationError::new("fecha_hora_fin");
            err.message =
                Some("fecha_hora_fin no puede ser anterior a fecha_hora_init".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[validate(schema(function = "validate_tarea_create"))]
pub struct TareaCreate {
    #[validate(custom = "validate_id")]
    pub id_usuario: i64,
    #[validate(length(min = 3, max = 500))]
    pub descripcion: String,
    pub fecha_hora_init: NaiveDateTime,
    #[serde(default)]
    pub estado: TareaEstado,
    pub fecha_hora_fin: Option<NaiveDateTime>,
}

fn validate_tarea_create(tarea: &TareaCreate) -> Result<(), ValidationError> {
    validate_rango(Some(&tarea.fecha_hora_init), tarea.fecha_hora_fin.as_ref())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[validate(schema(function = "validate_tarea_update"))]
pub struct TareaUpdate {
    #[validate(length(min = 3, max = 500))]
    pub descripcion: Option<String>,
    pub estado: Option<TareaEstado>,
    pub fecha_hora_init: Option<NaiveDateTime>,
    pub fecha_hora_fin: Option<NaiveDateTime>,
}

fn validate_tarea_update(tarea: &TareaUpdate) -> Result<(), ValidationError> {
    validate_rango(tarea.fecha_hora_init.as_ref(), tarea.fecha_hora_fin.as_ref())
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct TareaRow {
    pub id_tarea: i64,
    pub id_usuario: i64,
    pub descripcion: String,
    pub fecha_hora_init: NaiveDateTime,
    pub estado: String,
    pub fecha_hora_fin: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TareaOut {
    pub id_tarea: i64,
    pub id_usuario: i64,
    pub descripcion: String,
    pub fecha_hora_init: NaiveDateTime,
    pub estado: TareaEstado,
    pub fecha_hora_fin: Option<NaiveDateTime>,
}

impl TryFrom<TareaRow> for TareaOut {
    type Error = ServiceError;

    fn try_from(row: TareaRow) -> Result<Self, Self::Error> {
        let estado = TareaEstado::parse(&row.estado).ok_or_else(|| {
            ServiceError::InternalError(format!(
                "tarea {} con estado desconocido '{}'",
                row.id_tarea, row.estado
            ))
        })?;
        Ok(Self {
            id_tarea: row.id_tarea,
            id_usuario: row.id_usuario,
            descripcion: row.descripcion,
            fecha_hora_init: row.fecha_hora_init,
            estado,
            fecha_hora_fin: row.fecha_hora_fin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn estado_uses_snake_case_names() {
        let estado: TareaEstado = serde_json::from_str("\"en_proceso\"").unwrap();
        assert_eq!(estado, TareaEstado::EnProceso);
        assert_eq!(TareaEstado::parse("completada"), Some(TareaEstado::Completada));
        assert_eq!(TareaEstado::parse("archivada"), None);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let tarea = TareaCreate {
            id_usuario: 1,
            descripcion: "Limpiar galpón 2".into(),
            fecha_hora_init: at(10),
            estado: TareaEstado::Pendiente,
            fecha_hora_fin: Some(at(8)),
        };
        assert!(tarea.validate().is_err());
    }

    #[test]
    fn update_range_checked_only_when_both_present() {
        let only_end = TareaUpdate {
            fecha_hora_fin: Some(at(8)),
            ..Default::default()
        };
        assert!(only_end.validate().is_ok());

        let both = TareaUpdate {
            fecha_hora_init: Some(at(9)),
            fecha_hora_fin: Some(at(8)),
            ..Default::default()
        };
        assert!(both.validate().is_err());
    }
}
