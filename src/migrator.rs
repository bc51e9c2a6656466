use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_access_tables::Migration),
            Box::new(m20240501_000002_create_catalog_tables::Migration),
            Box::new(m20240501_000003_create_sales_tables::Migration),
            Box::new(m20240501_000004_create_tareas_table::Migration),
            Box::new(m20240501_000005_seed_reference_data::Migration),
        ]
    }
}

/// Auto-increment surrogate key. SQLite only accepts AUTOINCREMENT on an
/// `INTEGER PRIMARY KEY`, which is already a 64-bit rowid.
fn id_column(manager: &SchemaManager<'_>, col: impl IntoIden) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    match manager.get_database_backend() {
        DbBackend::Sqlite => def.integer(),
        _ => def.big_integer(),
    };
    def.not_null().auto_increment().primary_key();
    def
}

mod m20240501_000001_create_access_tables {
    use super::id_column;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000001_create_access_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(id_column(manager, Roles::IdRol))
                        .col(
                            ColumnDef::new(Roles::NombreRol)
                                .string_len(30)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Roles::Descripcion).string_len(500).not_null())
                        .col(
                            ColumnDef::new(Roles::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Modulos::Table)
                        .if_not_exists()
                        .col(id_column(manager, Modulos::IdModulo))
                        .col(
                            ColumnDef::new(Modulos::NombreModulo)
                                .string_len(30)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Permisos::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Permisos::IdRol).big_integer().not_null())
                        .col(ColumnDef::new(Permisos::IdModulo).big_integer().not_null())
                        .col(
                            ColumnDef::new(Permisos::Insertar)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Permisos::Actualizar)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Permisos::Seleccionar)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Permisos::Borrar)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .primary_key(
                            Index::create()
                                .col(Permisos::IdRol)
                                .col(Permisos::IdModulo),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_permisos_id_rol")
                                .from(Permisos::Table, Permisos::IdRol)
                                .to(Roles::Table, Roles::IdRol)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_permisos_id_modulo")
                                .from(Permisos::Table, Permisos::IdModulo)
                                .to(Modulos::Table, Modulos::IdModulo)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Usuarios::Table)
                        .if_not_exists()
                        .col(id_column(manager, Usuarios::IdUsuario))
                        .col(ColumnDef::new(Usuarios::Nombre).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Usuarios::Email)
                                .string_len(150)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Usuarios::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Usuarios::IdRol).big_integer().not_null())
                        .col(
                            ColumnDef::new(Usuarios::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_usuarios_id_rol")
                                .from(Usuarios::Table, Usuarios::IdRol)
                                .to(Roles::Table, Roles::IdRol)
                                .on_delete(ForeignKeyAction::NoAction),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Usuarios::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Permisos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Modulos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Roles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Roles {
        Table,
        IdRol,
        NombreRol,
        Descripcion,
        Estado,
    }

    #[derive(DeriveIden)]
    pub(super) enum Modulos {
        Table,
        IdModulo,
        NombreModulo,
    }

    #[derive(DeriveIden)]
    pub(super) enum Permisos {
        Table,
        IdRol,
        IdModulo,
        Insertar,
        Actualizar,
        Seleccionar,
        Borrar,
    }

    #[derive(DeriveIden)]
    pub(super) enum Usuarios {
        Table,
        IdUsuario,
        Nombre,
        Email,
        PasswordHash,
        IdRol,
        Estado,
    }
}

mod m20240501_000002_create_catalog_tables {
    use super::id_column;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MetodoPago::Table)
                        .if_not_exists()
                        .col(id_column(manager, MetodoPago::IdTipo))
                        .col(ColumnDef::new(MetodoPago::Nombre).string_len(30).not_null())
                        .col(
                            ColumnDef::new(MetodoPago::Descripcion)
                                .string_len(500)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MetodoPago::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Productos::Table)
                        .if_not_exists()
                        .col(id_column(manager, Productos::IdProducto))
                        .col(ColumnDef::new(Productos::Nombre).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Productos::Categoria)
                                .string_len(20)
                                .not_null()
                                .check(
                                    Expr::col(Productos::Categoria)
                                        .is_in(["huevos", "salvamento"]),
                                ),
                        )
                        .col(
                            ColumnDef::new(Productos::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Stock::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Stock::IdProducto)
                                .big_integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Stock::CantidadDisponible)
                                .big_integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(Stock::CantidadDisponible).gte(0)),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_id_producto")
                                .from(Stock::Table, Stock::IdProducto)
                                .to(Productos::Table, Productos::IdProducto)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Stock::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Productos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MetodoPago::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MetodoPago {
        Table,
        IdTipo,
        Nombre,
        Descripcion,
        Estado,
    }

    #[derive(DeriveIden)]
    pub(super) enum Productos {
        Table,
        IdProducto,
        Nombre,
        Categoria,
        Estado,
    }

    #[derive(DeriveIden)]
    enum Stock {
        Table,
        IdProducto,
        CantidadDisponible,
    }
}

mod m20240501_000003_create_sales_tables {
    use super::id_column;
    use super::m20240501_000001_create_access_tables::Usuarios;
    use super::m20240501_000002_create_catalog_tables::{MetodoPago, Productos};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000003_create_sales_tables"
        }
    }

    const DETALLE_TABLES: [&str; 2] = ["detalle_huevos", "detalle_salvamento"];

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Ventas::Table)
                        .if_not_exists()
                        .col(id_column(manager, Ventas::IdVenta))
                        .col(ColumnDef::new(Ventas::IdUsuario).big_integer().not_null())
                        .col(ColumnDef::new(Ventas::TipoPago).big_integer().not_null())
                        .col(ColumnDef::new(Ventas::FechaHora).timestamp().not_null())
                        .col(
                            ColumnDef::new(Ventas::Estado)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ventas_id_usuario")
                                .from(Ventas::Table, Ventas::IdUsuario)
                                .to(Usuarios::Table, Usuarios::IdUsuario)
                                .on_delete(ForeignKeyAction::NoAction),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ventas_tipo_pago")
                                .from(Ventas::Table, Ventas::TipoPago)
                                .to(MetodoPago::Table, MetodoPago::IdTipo)
                                .on_delete(ForeignKeyAction::NoAction),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ventas_fecha_hora")
                        .table(Ventas::Table)
                        .col(Ventas::FechaHora)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ventas_id_usuario")
                        .table(Ventas::Table)
                        .col(Ventas::IdUsuario)
                        .to_owned(),
                )
                .await?;

            for name in DETALLE_TABLES {
                let table = Alias::new(name);
                manager
                    .create_table(
                        Table::create()
                            .table(table.clone())
                            .if_not_exists()
                            .col(id_column(manager, Detalle::IdDetalle))
                            .col(ColumnDef::new(Detalle::IdProducto).big_integer().not_null())
                            .col(
                                ColumnDef::new(Detalle::Cantidad)
                                    .big_integer()
                                    .not_null()
                                    .check(Expr::col(Detalle::Cantidad).gt(0)),
                            )
                            .col(ColumnDef::new(Detalle::IdVenta).big_integer().not_null())
                            .col(
                                ColumnDef::new(Detalle::ValorDescuento)
                                    .big_integer()
                                    .not_null()
                                    .default(0),
                            )
                            .col(ColumnDef::new(Detalle::PrecioVenta).big_integer().not_null())
                            .foreign_key(
                                ForeignKey::create()
                                    .name(format!("fk_{}_id_venta", name))
                                    .from(table.clone(), Detalle::IdVenta)
                                    .to(Ventas::Table, Ventas::IdVenta)
                                    .on_delete(ForeignKeyAction::NoAction),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name(format!("fk_{}_id_producto", name))
                                    .from(table.clone(), Detalle::IdProducto)
                                    .to(Productos::Table, Productos::IdProducto)
                                    .on_delete(ForeignKeyAction::NoAction),
                            )
                            .to_owned(),
                    )
                    .await?;

                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(format!("idx_{}_id_venta", name))
                            .table(table)
                            .col(Detalle::IdVenta)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for name in DETALLE_TABLES {
                manager
                    .drop_table(Table::drop().table(Alias::new(name)).to_owned())
                    .await?;
            }
            manager
                .drop_table(Table::drop().table(Ventas::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Ventas {
        Table,
        IdVenta,
        IdUsuario,
        TipoPago,
        FechaHora,
        Estado,
    }

    #[derive(DeriveIden)]
    enum Detalle {
        IdDetalle,
        IdProducto,
        Cantidad,
        IdVenta,
        ValorDescuento,
        PrecioVenta,
    }
}

mod m20240501_000004_create_tareas_table {
    use super::id_column;
    use super::m20240501_000001_create_access_tables::Usuarios;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000004_create_tareas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tareas::Table)
                        .if_not_exists()
                        .col(id_column(manager, Tareas::IdTarea))
                        .col(ColumnDef::new(Tareas::IdUsuario).big_integer().not_null())
                        .col(ColumnDef::new(Tareas::Descripcion).string_len(500).not_null())
                        .col(ColumnDef::new(Tareas::FechaHoraInit).timestamp().not_null())
                        .col(ColumnDef::new(Tareas::Estado).string_len(20).not_null())
                        .col(ColumnDef::new(Tareas::FechaHoraFin).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tareas_id_usuario")
                                .from(Tareas::Table, Tareas::IdUsuario)
                                .to(Usuarios::Table, Usuarios::IdUsuario)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tareas_id_usuario")
                        .table(Tareas::Table)
                        .col(Tareas::IdUsuario)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tareas::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tareas {
        Table,
        IdTarea,
        IdUsuario,
        Descripcion,
        FechaHoraInit,
        Estado,
        FechaHoraFin,
    }
}

mod m20240501_000005_seed_reference_data {
    use super::m20240501_000001_create_access_tables::{Modulos, Permisos, Roles};
    use super::m20240501_000002_create_catalog_tables::MetodoPago;
    use sea_orm_migration::prelude::*;
    use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000005_seed_reference_data"
        }
    }

    const ROLES: [(i64, &str, &str); 4] = [
        (1, "Administrador", "Acceso total al sistema"),
        (2, "Supervisor", "Supervisa ventas, stock y tareas"),
        (3, "Vendedor", "Registra ventas y sus detalles"),
        (4, "Operario", "Ejecuta las tareas asignadas"),
    ];

    const MODULOS: [(i64, &str); 8] = [
        (1, "roles"),
        (2, "usuarios"),
        (3, "modulos"),
        (4, "stock"),
        (5, "ventas"),
        (6, "tareas"),
        (7, "permisos"),
        (8, "metodo_pago"),
    ];

    const METODOS_PAGO: [(i64, &str, &str); 2] = [
        (1, "Efectivo", "Pago en efectivo al momento de la venta"),
        (2, "Transferencia", "Transferencia bancaria"),
    ];

    const SEQUENCES: [(&str, &str); 3] = [
        ("roles", "id_rol"),
        ("modulos", "id_modulo"),
        ("metodo_pago", "id_tipo"),
    ];

    fn seed_err(err: impl std::fmt::Display) -> DbErr {
        DbErr::Custom(format!("invalid seed statement: {}", err))
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut roles = Query::insert();
            roles.into_table(Roles::Table).columns([
                Roles::IdRol,
                Roles::NombreRol,
                Roles::Descripcion,
                Roles::Estado,
            ]);
            for (id, nombre, descripcion) in ROLES {
                roles
                    .values([id.into(), nombre.into(), descripcion.into(), true.into()])
                    .map_err(seed_err)?;
            }
            manager.exec_stmt(roles).await?;

            let mut modulos = Query::insert();
            modulos
                .into_table(Modulos::Table)
                .columns([Modulos::IdModulo, Modulos::NombreModulo]);
            for (id, nombre) in MODULOS {
                modulos
                    .values([id.into(), nombre.into()])
                    .map_err(seed_err)?;
            }
            manager.exec_stmt(modulos).await?;

            // The administrator role gets the full matrix.
            let mut permisos = Query::insert();
            permisos.into_table(Permisos::Table).columns([
                Permisos::IdRol,
                Permisos::IdModulo,
                Permisos::Insertar,
                Permisos::Actualizar,
                Permisos::Seleccionar,
                Permisos::Borrar,
            ]);
            for (id_modulo, _) in MODULOS {
                permisos
                    .values([
                        1i64.into(),
                        id_modulo.into(),
                        true.into(),
                        true.into(),
                        true.into(),
                        true.into(),
                    ])
                    .map_err(seed_err)?;
            }
            manager.exec_stmt(permisos).await?;

            let mut metodos = Query::insert();
            metodos.into_table(MetodoPago::Table).columns([
                MetodoPago::IdTipo,
                MetodoPago::Nombre,
                MetodoPago::Descripcion,
                MetodoPago::Estado,
            ]);
            for (id, nombre, descripcion) in METODOS_PAGO {
                metodos
                    .values([id.into(), nombre.into(), descripcion.into(), true.into()])
                    .map_err(seed_err)?;
            }
            manager.exec_stmt(metodos).await?;

            // Explicit ids leave Postgres identity sequences behind.
            if manager.get_database_backend() == DbBackend::Postgres {
                for (table, column) in SEQUENCES {
                    manager
                        .get_connection()
                        .execute_unprepared(&format!(
                            "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), (SELECT MAX({column}) FROM {table}))"
                        ))
                        .await?;
                }
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let conn = manager.get_connection();
            for table in ["permisos", "metodo_pago", "modulos", "roles"] {
                conn.execute_unprepared(&format!("DELETE FROM {}", table))
                    .await?;
            }
            Ok(())
        }
    }
}
