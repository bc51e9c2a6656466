mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, expect_json, TestApp, ROL_VENDEDOR};
use serde_json::json;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/ventas/all-ventas", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "AUTH_MISSING");

    let response = app
        .request(Method::GET, "/ventas/all-ventas", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "AUTH_INVALID_TOKEN");
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = TestApp::new().await;

    let root = expect_json(app.request(Method::GET, "/", None, None).await, StatusCode::OK).await;
    assert_eq!(root["message"], "ok gestion granja");
    assert_eq!(root["version"], env!("CARGO_PKG_VERSION"));

    let health = expect_json(
        app.request(Method::GET, "/health", None, None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(health["status"], "up");
    assert_eq!(health["database"], "up");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/", None, None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn role_without_grant_is_rejected_until_assigned() {
    let app = TestApp::new().await;
    let vendedor = app.vendedor.token.clone();

    let response = app
        .request(Method::GET, "/ventas/all-ventas", None, Some(&vendedor))
        .await;
    let body = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Usuario no autorizado"));

    let permiso = app
        .admin_json(
            Method::PUT,
            "/permisos/asignar",
            Some(json!({
                "id_rol": ROL_VENDEDOR,
                "id_modulo": 5,
                "seleccionar": true,
            })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(permiso["nombre_modulo"], "ventas");
    assert_eq!(permiso["seleccionar"], true);
    assert_eq!(permiso["insertar"], false);

    let response = app
        .request(Method::GET, "/ventas/all-ventas", None, Some(&vendedor))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/ventas/crear",
            Some(json!({
                "id_usuario": app.vendedor.id_usuario,
                "fecha_hora": "2024-05-10T08:30:00",
            })),
            Some(&vendedor),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reassigning replaces the whole row.
    app.admin_json(
        Method::PUT,
        "/permisos/asignar",
        Some(json!({
            "id_rol": ROL_VENDEDOR,
            "id_modulo": 5,
            "seleccionar": true,
            "insertar": true,
        })),
        StatusCode::OK,
    )
    .await;
    let permisos = app
        .admin_json(
            Method::GET,
            &format!("/permisos/by-rol?rol_id={ROL_VENDEDOR}"),
            None,
            StatusCode::OK,
        )
        .await;
    let permisos = permisos.as_array().unwrap();
    assert_eq!(permisos.len(), 1);
    assert_eq!(permisos[0]["insertar"], true);

    // An inactive role loses every grant.
    app.admin_json(
        Method::PUT,
        &format!("/roles/cambiar-estado/{ROL_VENDEDOR}"),
        Some(json!({ "estado": false })),
        StatusCode::OK,
    )
    .await;
    let response = app
        .request(Method::GET, "/ventas/all-ventas", None, Some(&vendedor))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn assigning_to_unknown_role_or_module_is_not_found() {
    let app = TestApp::new().await;

    app.admin_json(
        Method::PUT,
        "/permisos/asignar",
        Some(json!({ "id_rol": 99, "id_modulo": 5, "seleccionar": true })),
        StatusCode::NOT_FOUND,
    )
    .await;
    app.admin_json(
        Method::PUT,
        "/permisos/asignar",
        Some(json!({ "id_rol": ROL_VENDEDOR, "id_modulo": 99, "seleccionar": true })),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn operario_sees_only_their_own_tasks() {
    let app = TestApp::new().await;

    for (id_usuario, descripcion) in [
        (app.operario.id_usuario, "Recoger huevos del galpón 2"),
        (app.operario.id_usuario, "Limpiar bebederos"),
        (app.admin.id_usuario, "Revisar inventario"),
    ] {
        app.admin_json(
            Method::POST,
            "/tareas/crear",
            Some(json!({
                "id_usuario": id_usuario,
                "descripcion": descripcion,
                "fecha_hora_init": "2024-05-10T06:00:00",
            })),
            StatusCode::CREATED,
        )
        .await;
    }

    let operario = app.operario.token.clone();
    let propias = expect_json(
        app.request(
            Method::GET,
            &format!("/tareas/usuario/{}", app.operario.id_usuario),
            None,
            Some(&operario),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let propias = propias.as_array().unwrap();
    assert_eq!(propias.len(), 2);
    assert_eq!(propias[0]["estado"], "pendiente");

    let ajenas = expect_json(
        app.request(
            Method::GET,
            &format!("/tareas/usuario/{}", app.admin.id_usuario),
            None,
            Some(&operario),
        )
        .await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert!(ajenas["message"]
        .as_str()
        .unwrap()
        .contains("No tienes permiso para ver tareas de otros usuarios"));

    // Other roles go through the permission table.
    let response = app
        .request(
            Method::GET,
            &format!("/tareas/usuario/{}", app.operario.id_usuario),
            None,
            Some(&app.vendedor.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let del_admin = app
        .admin_json(
            Method::GET,
            &format!("/tareas/usuario/{}", app.operario.id_usuario),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(del_admin.as_array().unwrap().len(), 2);

    let body = app
        .admin_json(
            Method::GET,
            &format!("/tareas/usuario/{}", app.vendedor.id_usuario),
            None,
            StatusCode::NOT_FOUND,
        )
        .await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("No hay tareas para este usuario"));
}

#[tokio::test]
async fn login_issues_a_working_token() {
    let app = TestApp::new().await;

    let token = expect_json(
        app.request(
            Method::POST,
            "/access/token",
            Some(json!({
                "email": app.operario.email,
                "password": app.operario.password,
            })),
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(token["token_type"], "bearer");
    let access_token = token["access_token"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            &format!("/tareas/usuario/{}", app.operario.id_usuario),
            None,
            Some(&access_token),
        )
        .await;
    // Authenticated and allowed; the operario simply has no tasks yet.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(
            Method::POST,
            "/access/token",
            Some(json!({
                "email": app.operario.email,
                "password": "otra-clave",
            })),
            None,
        )
        .await;
    let body = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["error"]["message"], "Credenciales inválidas");
}
