#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use granja_api::{
    auth::{create_user, NewUsuario, TokenSubject, ROL_ADMINISTRADOR, ROL_OPERARIO},
    build_router,
    config::AppConfig,
    db, AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ROL_VENDEDOR: i64 = 3;

/// A user seeded for the test run, with a token minted by the real auth service.
pub struct TestUser {
    pub id_usuario: i64,
    pub email: String,
    pub password: String,
    pub token: String,
}

/// Helper harness backed by a migrated SQLite file in a temporary directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: TestUser,
    pub operario: TestUser,
    pub vendedor: TestUser,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = dir.path().join("granja_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "pruebas-granja-api-clave-secreta-0123456789".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);

        let admin = seed_user(&state, "Admin", "admin@granja.test", ROL_ADMINISTRADOR).await;
        let operario = seed_user(&state, "Rosa", "rosa@granja.test", ROL_OPERARIO).await;
        let vendedor = seed_user(&state, "Luis", "luis@granja.test", ROL_VENDEDOR).await;

        let router = build_router(state.clone());

        Self {
            router,
            state,
            admin,
            operario,
            vendedor,
            _dir: dir,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Authenticated as the administrator, which holds every permission.
    pub async fn admin_request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(&self.admin.token)).await
    }

    /// Request as admin, asserting the status and returning the JSON body.
    pub async fn admin_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        expected: StatusCode,
    ) -> Value {
        let response = self.admin_request(method, uri, body).await;
        expect_json(response, expected).await
    }

    pub async fn crear_producto(&self, nombre: &str, categoria: &str, cantidad: i64) -> i64 {
        let body = self
            .admin_json(
                Method::POST,
                "/stock/crear",
                Some(json!({
                    "nombre": nombre,
                    "categoria": categoria,
                    "cantidad_disponible": cantidad,
                })),
                StatusCode::CREATED,
            )
            .await;
        body["id_producto"].as_i64().expect("id_producto")
    }

    pub async fn crear_venta(&self) -> i64 {
        let body = self
            .admin_json(
                Method::POST,
                "/ventas/crear",
                Some(json!({
                    "id_usuario": self.admin.id_usuario,
                    "fecha_hora": "2024-05-10T08:30:00",
                })),
                StatusCode::CREATED,
            )
            .await;
        body["venta"]["id_venta"].as_i64().expect("id_venta")
    }

    pub async fn crear_detalle(
        &self,
        categoria: &str,
        id_venta: i64,
        id_producto: i64,
        cantidad: i64,
        precio: &str,
    ) -> Response {
        self.admin_request(
            Method::POST,
            &format!("/detalle-{categoria}/crear"),
            Some(json!({
                "id_producto": id_producto,
                "cantidad": cantidad,
                "id_venta": id_venta,
                "valor_descuento": "0",
                "precio_venta": precio,
            })),
        )
        .await
    }

    pub async fn stock_de(&self, id_producto: i64) -> i64 {
        let body = self
            .admin_json(
                Method::GET,
                &format!("/stock/by-producto?producto_id={id_producto}"),
                None,
                StatusCode::OK,
            )
            .await;
        body["cantidad_disponible"].as_i64().expect("cantidad_disponible")
    }
}

async fn seed_user(state: &AppState, nombre: &str, email: &str, id_rol: i64) -> TestUser {
    let password = format!("{}-clave-123", nombre.to_lowercase());
    let id_usuario = create_user(
        state.db.as_ref(),
        NewUsuario {
            nombre: nombre.to_string(),
            email: email.to_string(),
            password: password.clone(),
            id_rol,
        },
    )
    .await
    .expect("seed user");

    let token = state
        .auth
        .generate_token(&TokenSubject {
            id_usuario,
            id_rol,
            nombre: nombre.to_string(),
        })
        .expect("mint token")
        .access_token;

    TestUser {
        id_usuario,
        email: email.to_string(),
        password,
        token,
    }
}

/// Read the body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Assert the status, then read the body as JSON.
pub async fn expect_json(response: Response, expected: StatusCode) -> Value {
    let status = response.status();
    let body = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
