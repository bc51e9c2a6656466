pub mod detalle;
pub mod metodo_pago;
pub mod modulos;
pub mod permisos;
pub mod roles;
pub mod stock;
pub mod tareas;
pub mod ventas;
