use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Granja API",
        version = "1.0.0",
        description = r#"
# Gestión de granja

Sales, line items and stock for an egg farm, plus the role/module permission
matrix and staff tasks.

## Authentication

Exchange credentials at `POST /access/token` and send the token on every other call:

```
Authorization: Bearer <jwt>
```

Each route group checks the caller's role against the `permisos` table. A denied
check answers 401.

## Money

Prices, discounts and totals are decimals with at most two places.

## Pagination

Sale listings accept `page` (from 1) and `page_size` (1 to the configured maximum).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "ventas", description = "Sales and their cancellation"),
        (name = "stock", description = "Products and available quantities"),
        (name = "tareas", description = "Staff tasks"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::health::health_check,
        crate::auth::login_handler,

        // Ventas
        crate::handlers::ventas::create_venta,
        crate::handlers::ventas::list_ventas,
        crate::handlers::ventas::list_ventas_by_fecha,
        crate::handlers::ventas::list_ventas_by_usuario,
        crate::handlers::ventas::list_ventas_by_tipo_pago,
        crate::handlers::ventas::get_venta,
        crate::handlers::ventas::update_venta,
        crate::handlers::ventas::cambiar_estado_venta,
        crate::handlers::ventas::delete_venta,
        crate::handlers::ventas::get_venta_detalles,

        // Stock
        crate::handlers::stock::create_producto,
        crate::handlers::stock::list_stock,
        crate::handlers::stock::get_stock,
        crate::handlers::stock::set_stock,

        // Tareas
        crate::handlers::tareas::list_tareas,
        crate::handlers::tareas::create_tarea,
        crate::handlers::tareas::list_tareas_by_usuario,
    ),
    components(
        schemas(
            crate::models::MessageResponse,
            crate::models::Categoria,
            crate::models::tarea::TareaEstado,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_core_routes() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Granja API"));
        assert!(json.contains("/ventas/crear"));
        assert!(json.contains("/stock/by-producto/{producto_id}"));
        assert!(json.contains("/access/token"));
        assert!(json.contains("\"Bearer\""));
    }
}
