mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, expect_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn sale_with_lines_moves_stock_and_cancellation_restores_it() {
    let app = TestApp::new().await;
    let huevos = app.crear_producto("Huevo AA", "huevos", 100).await;
    let salvamento = app.crear_producto("Gallina de descarte", "salvamento", 20).await;
    let id_venta = app.crear_venta().await;

    let response = app
        .crear_detalle("huevos", id_venta, huevos, 10, "1500.50")
        .await;
    let detalle = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(detalle["cantidad"], 10);
    assert_eq!(detalle["precio_venta"], "1500.50");

    let response = app
        .crear_detalle("salvamento", id_venta, salvamento, 2, "8000")
        .await;
    expect_json(response, StatusCode::CREATED).await;

    assert_eq!(app.stock_de(huevos).await, 90);
    assert_eq!(app.stock_de(salvamento).await, 18);

    let venta = app
        .admin_json(
            Method::GET,
            &format!("/ventas/by-id?venta_id={id_venta}"),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(venta["total"], "31005.00");
    assert_eq!(venta["tipo_pago"], 1);
    assert_eq!(venta["metodo_pago"], "Efectivo");

    let detalles = app
        .admin_json(
            Method::GET,
            &format!("/ventas/detalles?venta_id={id_venta}"),
            None,
            StatusCode::OK,
        )
        .await;
    let detalles = detalles.as_array().unwrap();
    assert_eq!(detalles.len(), 2);
    assert_eq!(detalles[0]["tipo"], "huevos");
    assert_eq!(detalles[0]["subtotal"], "15005.00");
    assert_eq!(detalles[1]["tipo"], "salvamento");

    // Cancel: every line goes back to stock and disappears.
    let body = app
        .admin_json(
            Method::PUT,
            &format!("/ventas/cambiar-estado/{id_venta}"),
            Some(json!({ "estado": false })),
            StatusCode::OK,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("cancelada"));

    assert_eq!(app.stock_de(huevos).await, 100);
    assert_eq!(app.stock_de(salvamento).await, 20);

    let detalles = app
        .admin_json(
            Method::GET,
            &format!("/ventas/detalles?venta_id={id_venta}"),
            None,
            StatusCode::OK,
        )
        .await;
    assert!(detalles.as_array().unwrap().is_empty());

    let venta = app
        .admin_json(
            Method::GET,
            &format!("/ventas/by-id?venta_id={id_venta}"),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(venta["estado"], false);
    assert_eq!(venta["total"], "0.00");

    // A cancelled sale stays cancelled and accepts no more changes.
    let body = app
        .admin_json(
            Method::PUT,
            &format!("/ventas/cambiar-estado/{id_venta}"),
            Some(json!({ "estado": true })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains(&format!("La venta {id_venta} ya está cancelada")));

    app.admin_json(
        Method::PUT,
        &format!("/ventas/by-id/{id_venta}"),
        Some(json!({ "tipo_pago": 1 })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let response = app
        .crear_detalle("huevos", id_venta, huevos, 1, "1500")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_de(huevos).await, 100);

    app.admin_json(
        Method::DELETE,
        &format!("/ventas/by-id/{id_venta}"),
        None,
        StatusCode::OK,
    )
    .await;
    app.admin_json(
        Method::GET,
        &format!("/ventas/by-id?venta_id={id_venta}"),
        None,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn line_beyond_available_stock_is_rejected() {
    let app = TestApp::new().await;
    let huevos = app.crear_producto("Huevo A", "huevos", 5).await;
    let id_venta = app.crear_venta().await;

    let response = app.crear_detalle("huevos", id_venta, huevos, 6, "900").await;
    let body = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Stock insuficiente para completar la operación"));

    assert_eq!(app.stock_de(huevos).await, 5);

    let detalles = app
        .admin_json(
            Method::GET,
            &format!("/detalle-huevos/by-venta?venta_id={id_venta}"),
            None,
            StatusCode::OK,
        )
        .await;
    assert!(detalles.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn changing_the_product_of_a_line_moves_stock_between_products() {
    let app = TestApp::new().await;
    let blanco = app.crear_producto("Huevo blanco", "huevos", 10).await;
    let rojo = app.crear_producto("Huevo rojo", "huevos", 10).await;
    let id_venta = app.crear_venta().await;

    let response = app.crear_detalle("huevos", id_venta, blanco, 4, "500").await;
    let detalle = expect_json(response, StatusCode::CREATED).await;
    let id_detalle = detalle["id_detalle"].as_i64().unwrap();
    assert_eq!(app.stock_de(blanco).await, 6);

    app.admin_json(
        Method::PUT,
        &format!("/detalle-huevos/by-id/{id_detalle}"),
        Some(json!({ "id_producto": rojo, "cantidad": 3 })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(app.stock_de(blanco).await, 10);
    assert_eq!(app.stock_de(rojo).await, 7);

    let actualizado = app
        .admin_json(
            Method::PUT,
            &format!("/detalle-huevos/by-id/{id_detalle}"),
            Some(json!({ "cantidad": 5 })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(actualizado["id_producto"], rojo);
    assert_eq!(app.stock_de(rojo).await, 5);

    // Asking for more than what is left fails and leaves everything untouched.
    app.admin_json(
        Method::PUT,
        &format!("/detalle-huevos/by-id/{id_detalle}"),
        Some(json!({ "cantidad": 11 })),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(app.stock_de(rojo).await, 5);

    app.admin_json(
        Method::DELETE,
        &format!("/detalle-huevos/by-id/{id_detalle}"),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(app.stock_de(rojo).await, 10);

    app.admin_json(
        Method::GET,
        &format!("/detalle-huevos/by-id?detalle_id={id_detalle}"),
        None,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn lines_must_match_the_product_category() {
    let app = TestApp::new().await;
    let gallina = app.crear_producto("Gallina", "salvamento", 10).await;
    let id_venta = app.crear_venta().await;

    let response = app.crear_detalle("huevos", id_venta, gallina, 1, "100").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_de(gallina).await, 10);
}

#[tokio::test]
async fn discount_above_price_is_a_validation_error() {
    let app = TestApp::new().await;
    let huevos = app.crear_producto("Huevo B", "huevos", 10).await;
    let id_venta = app.crear_venta().await;

    let response = app
        .admin_request(
            Method::POST,
            "/detalle-huevos/crear",
            Some(json!({
                "id_producto": huevos,
                "cantidad": 1,
                "id_venta": id_venta,
                "valor_descuento": "200",
                "precio_venta": "100",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .admin_request(
            Method::POST,
            "/detalle-huevos/crear",
            Some(json!({
                "id_producto": huevos,
                "cantidad": 1,
                "id_venta": id_venta,
                "valor_descuento": "0",
                "precio_venta": "100.555",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_de(huevos).await, 10);
}

#[tokio::test]
async fn only_cancelled_sales_can_be_deleted() {
    let app = TestApp::new().await;
    let id_venta = app.crear_venta().await;

    let body = app
        .admin_json(
            Method::DELETE,
            &format!("/ventas/by-id/{id_venta}"),
            None,
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Solo se pueden eliminar ventas canceladas"));

    app.admin_json(
        Method::DELETE,
        "/ventas/by-id/9999",
        None,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn sale_update_validates_body_and_references() {
    let app = TestApp::new().await;
    let id_venta = app.crear_venta().await;

    let body = app
        .admin_json(
            Method::PUT,
            &format!("/ventas/by-id/{id_venta}"),
            Some(json!({})),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("No hay campos para actualizar"));

    app.admin_json(
        Method::PUT,
        &format!("/ventas/by-id/{id_venta}"),
        Some(json!({ "tipo_pago": 77 })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let body = app
        .admin_json(
            Method::PUT,
            &format!("/ventas/by-id/{id_venta}"),
            Some(json!({ "id_usuario": app.operario.id_usuario })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(body["message"], "Venta actualizada correctamente");

    let venta = app
        .admin_json(
            Method::GET,
            &format!("/ventas/by-id?venta_id={id_venta}"),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(venta["id_usuario"], app.operario.id_usuario);
    assert_eq!(venta["nombre_usuario"], "Rosa");

    app.admin_json(
        Method::PUT,
        "/ventas/by-id/9999",
        Some(json!({ "tipo_pago": 1 })),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn sale_listings_are_paginated_and_filtered() {
    let app = TestApp::new().await;
    for _ in 0..3 {
        app.crear_venta().await;
    }
    app.admin_json(
        Method::POST,
        "/ventas/crear",
        Some(json!({
            "id_usuario": app.operario.id_usuario,
            "fecha_hora": "2024-06-02T23:59:59",
        })),
        StatusCode::CREATED,
    )
    .await;

    let page = app
        .admin_json(
            Method::GET,
            "/ventas/all-ventas?page=1&page_size=3",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(page["total_ventas"], 4);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["ventas"].as_array().unwrap().len(), 3);

    let page = app
        .admin_json(
            Method::GET,
            "/ventas/all-ventas?page=2&page_size=3",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(page["ventas"].as_array().unwrap().len(), 1);
    assert_eq!(page["page"], 2);

    app.admin_json(
        Method::GET,
        "/ventas/all-ventas?page_size=0",
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;
    app.admin_json(
        Method::GET,
        "/ventas/all-ventas?page_size=101",
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;
    app.admin_json(
        Method::GET,
        "/ventas/all-ventas?page=0",
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;
    app.admin_json(
        Method::GET,
        "/ventas/all-ventas?page=18446744073709551615&page_size=100",
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;

    // The end date is inclusive, up to the last second of the day.
    let junio = app
        .admin_json(
            Method::GET,
            "/ventas/all-by-fecha?fecha_inicio=2024-06-01&fecha_fin=2024-06-02",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(junio["total_ventas"], 1);

    let mayo = app
        .admin_json(
            Method::GET,
            "/ventas/all-by-fecha?fecha_inicio=2024-05-10&fecha_fin=2024-05-10",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(mayo["total_ventas"], 3);

    // Open-ended range up to the last representable date.
    let hasta_el_final = app
        .admin_json(
            Method::GET,
            "/ventas/all-by-fecha?fecha_inicio=2024-01-01&fecha_fin=%2B262142-12-31",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(hasta_el_final["total_ventas"], 4);

    app.admin_json(
        Method::GET,
        "/ventas/all-by-fecha?fecha_inicio=2024-06-02&fecha_fin=2024-06-01",
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let por_usuario = app
        .admin_json(
            Method::GET,
            &format!("/ventas/all-by-usuario?id_usuario={}", app.operario.id_usuario),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(por_usuario["total_ventas"], 1);

    let por_tipo = app
        .admin_json(
            Method::GET,
            "/ventas/all-by-tipo-pago?tipo_pago=1&page_size=10",
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(por_tipo["total_ventas"], 4);
    assert_eq!(por_tipo["total_pages"], 1);
}

#[tokio::test]
async fn unknown_sale_answers_not_found() {
    let app = TestApp::new().await;

    let response = app
        .admin_request(Method::GET, "/ventas/by-id?venta_id=4242", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Venta no encontrada"));
    assert!(body["timestamp"].is_string());

    app.admin_json(
        Method::GET,
        "/ventas/detalles?venta_id=4242",
        None,
        StatusCode::NOT_FOUND,
    )
    .await;
    app.admin_json(
        Method::PUT,
        "/ventas/cambiar-estado/4242",
        Some(json!({ "estado": false })),
        StatusCode::NOT_FOUND,
    )
    .await;
}
