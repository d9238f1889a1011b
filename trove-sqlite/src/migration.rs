use crate::{SqliteConnection, SqliteSqlWriter};
use trove_core::{EntityModel, Error, ErrorContext, Model, Result, Value};

/// Declared type of every column of `entity`, empty when the table is missing.
pub(crate) fn table_info(
    connection: &mut SqliteConnection,
    entity: &str,
) -> Result<Vec<(String, String)>> {
    let mut sql = String::new();
    SqliteSqlWriter::default().write_table_info(&mut sql, entity);
    connection
        .prepare(&sql)?
        .fetch()?
        .into_iter()
        .map(|row| match (row.get("name"), row.get("type")) {
            (Some(Value::Varchar(name)), Some(Value::Varchar(kind))) => {
                Ok((name.clone(), kind.clone()))
            }
            _ => Err(Error::msg(format!(
                "Unexpected table_info row for `{}`",
                entity
            ))),
        })
        .collect()
}

fn migrate_entity(connection: &mut SqliteConnection, entity: &EntityModel) -> Result<()> {
    let writer = SqliteSqlWriter::default();
    let existing = table_info(connection, &entity.name)?;
    let mut sql = String::new();
    if existing.is_empty() {
        log::debug!("Creating the table `{}`", entity.name);
        writer.write_create_table(&mut sql, entity);
    } else {
        for column in &entity.columns {
            match existing.iter().find(|(name, _)| *name == column.name) {
                Some((_, declared)) => {
                    let mut expected = String::new();
                    writer.write_column_type(&mut expected, column.kind);
                    if !declared.eq_ignore_ascii_case(&expected) {
                        return Err(Error::msg(format!(
                            "The column `{}.{}` is declared as {} but the model requires {}",
                            entity.name, column.name, declared, expected
                        )));
                    }
                }
                None => {
                    log::debug!("Adding the column `{}.{}`", entity.name, column.name);
                    writer.write_add_column(&mut sql, &entity.name, column);
                }
            }
        }
    }
    if entity.column("id").is_some() {
        writer.write_create_index(&mut sql, &entity.name, "id");
    }
    if !sql.is_empty() {
        connection.execute_batch(&sql)?;
    }
    Ok(())
}

/// Brings the database schema up to `model`: creates the missing tables,
/// adds the missing columns, and fails on a column whose type changed.
pub(crate) fn migrate(connection: &mut SqliteConnection, model: &Model) -> Result<()> {
    let writer = SqliteSqlWriter::default();
    let mut sql = String::new();
    writer.write_transaction_begin(&mut sql);
    connection.execute_batch(&sql)?;
    let result = model
        .entities
        .iter()
        .try_for_each(|entity| migrate_entity(connection, entity));
    sql.clear();
    let result = match result {
        Ok(()) => {
            writer.write_transaction_commit(&mut sql);
            connection.execute_batch(&sql)
        }
        Err(error) => {
            writer.write_transaction_rollback(&mut sql);
            let _ = connection.execute_batch(&sql);
            Err(error)
        }
    };
    result.with_context(|| format!("Could not migrate the `{}` model", model.name))
}
