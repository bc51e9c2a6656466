use super::password::hash_password;
use crate::config::AppConfig;
use crate::db;
use crate::errors::ServiceError;
use sea_orm::{ConnectionTrait, FromQueryResult};
use tracing::{info, instrument};

/// Administrator role seeded by the migrations
pub const ROL_ADMINISTRADOR: i64 = 1;
/// Field-worker role; may only read its own tasks
pub const ROL_OPERARIO: i64 = 4;

#[derive(Debug, Clone)]
pub struct NewUsuario {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub id_rol: i64,
}

/// Credentials row used by login
#[derive(Debug, Clone, FromQueryResult)]
pub struct UsuarioCredenciales {
    pub id_usuario: i64,
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
    pub id_rol: i64,
}

/// Hashes the password and inserts an active user, returning its id.
#[instrument(skip(conn, usuario), fields(email = %usuario.email, id_rol = usuario.id_rol))]
pub async fn create_user<C>(conn: &C, usuario: NewUsuario) -> Result<i64, ServiceError>
where
    C: ConnectionTrait,
{
    let password_hash = hash_password(&usuario.password)?;
    let id = db::insert_returning_id(
        conn,
        "INSERT INTO usuarios (nombre, email, password_hash, id_rol, estado) VALUES (?, ?, ?, ?, ?) RETURNING id_usuario",
        vec![
            usuario.nombre.into(),
            usuario.email.to_lowercase().into(),
            password_hash.into(),
            usuario.id_rol.into(),
            true.into(),
        ],
        "id_usuario",
    )
    .await?;
    info!(id_usuario = id, "user created");
    Ok(id)
}

pub async fn find_active_by_email<C>(
    conn: &C,
    email: &str,
) -> Result<Option<UsuarioCredenciales>, ServiceError>
where
    C: ConnectionTrait,
{
    Ok(db::query_one(
        conn,
        "SELECT id_usuario, nombre, email, password_hash, id_rol FROM usuarios WHERE email = ? AND estado = ?",
        vec![email.to_lowercase().into(), true.into()],
    )
    .await?)
}

/// Creates the configured administrator when its email is not registered yet.
pub async fn ensure_bootstrap_admin<C>(conn: &C, config: &AppConfig) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    #[derive(FromQueryResult)]
    struct Existing {
        #[allow(dead_code)]
        id_usuario: i64,
    }

    let existing: Option<Existing> = db::query_one(
        conn,
        "SELECT id_usuario FROM usuarios WHERE email = ?",
        vec![email.to_lowercase().into()],
    )
    .await?;
    if existing.is_some() {
        info!(email, "bootstrap admin already present");
        return Ok(());
    }

    create_user(
        conn,
        NewUsuario {
            nombre: config
                .bootstrap_admin_name
                .clone()
                .unwrap_or_else(|| "Administrador".to_string()),
            email: email.to_string(),
            password: password.to_string(),
            id_rol: ROL_ADMINISTRADOR,
        },
    )
    .await?;
    Ok(())
}
