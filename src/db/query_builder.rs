use crate::errors::ServiceError;
use sea_orm::{ConnectionTrait, Value};

/// Builder for `UPDATE` statements that only touch the fields a caller supplied.
///
/// Columns are `'static` so only names written in code can reach the SQL text; every
/// value travels as a bound parameter.
#[derive(Debug, Clone)]
pub struct PartialUpdate {
    table: &'static str,
    assignments: Vec<(&'static str, Value)>,
}

impl PartialUpdate {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    /// Unconditionally assign a column
    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Assign a column only when a value was provided
    pub fn set_opt<V>(self, column: &'static str, value: Option<V>) -> Self
    where
        V: Into<Value>,
    {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Renders `UPDATE <table> SET a = ?, b = ? WHERE <key_column> = ?`.
    ///
    /// Returns `None` when nothing was assigned.
    pub fn build(self, key_column: &'static str, key: impl Into<Value>) -> Option<(String, Vec<Value>)> {
        if self.assignments.is_empty() {
            return None;
        }

        let set_clause = self
            .assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table, set_clause, key_column
        );

        let mut values: Vec<Value> = self.assignments.into_iter().map(|(_, v)| v).collect();
        values.push(key.into());
        Some((sql, values))
    }

    /// Executes the update, returning the affected row count.
    ///
    /// An empty update is rejected before anything reaches the database.
    pub async fn execute<C>(
        self,
        conn: &C,
        key_column: &'static str,
        key: impl Into<Value>,
    ) -> Result<u64, ServiceError>
    where
        C: ConnectionTrait,
    {
        let table = self.table;
        let (sql, values) = self
            .build(key_column, key)
            .ok_or_else(ServiceError::nothing_to_update)?;
        tracing::debug!(table, sql = %sql, "partial update");
        Ok(super::execute(conn, &sql, values).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supplied_fields_are_set() {
        let (sql, values) = PartialUpdate::new("metodo_pago")
            .set_opt("nombre", Some("Transferencia".to_string()))
            .set_opt::<String>("descripcion", None)
            .set_opt("estado", Some(false))
            .build("id_tipo", 2i64)
            .unwrap();

        assert_eq!(
            sql,
            "UPDATE metodo_pago SET nombre = ?, estado = ? WHERE id_tipo = ?"
        );
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], Value::BigInt(Some(2)));
    }

    #[test]
    fn empty_update_builds_nothing() {
        let update = PartialUpdate::new("roles").set_opt::<bool>("estado", None);
        assert!(update.is_empty());
        assert!(update.build("id_rol", 1i64).is_none());
    }

    #[test]
    fn assignments_keep_insertion_order() {
        let (sql, values) = PartialUpdate::new("tareas")
            .set("estado", "completada")
            .set("descripcion", "Recoger huevos")
            .build("id_tarea", 7i64)
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE tareas SET estado = ?, descripcion = ? WHERE id_tarea = ?"
        );
        assert_eq!(values[0], Value::from("completada"));
    }
}
