use crate::{SqliteConnection, SqlitePrepared, SqliteSqlWriter, migration::migrate};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use trove_core::{
    Config, Error, ErrorContext, Model, Orderby, Pager, Record, Recovery, Result, Row, RowId,
    Store, StoredRow, Value, Where,
};

/// `Store` over a sqlite database file, one table per entity.
pub struct SqliteStore {
    connection: SqliteConnection,
    writer: SqliteSqlWriter,
    model: Model,
    path: Option<PathBuf>,
}

fn remove_database(path: &Path) -> Result<()> {
    let mut companions = [path.to_path_buf(), path.to_path_buf(), path.to_path_buf()];
    companions[1].as_mut_os_string().push("-wal");
    companions[2].as_mut_os_string().push("-shm");
    for file in companions {
        match fs::remove_file(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                let error = Error::new(e).context(format!("Could not remove `{}`", file.display()));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
    }
    Ok(())
}

fn stored_row(row: Row) -> Result<StoredRow> {
    match row.values.first() {
        Some(Value::Int64(row_id)) => Ok(StoredRow {
            row_id: RowId(*row_id),
            row: Row::new(row.labels[1..].into(), row.values[1..].into()),
        }),
        _ => Err(Error::msg("The row has no rowid")),
    }
}

fn fetch_one(mut prepared: SqlitePrepared) -> Result<Option<StoredRow>> {
    prepared.fetch()?.into_iter().next().map(stored_row).transpose()
}

fn row_ids(rows: Vec<Row>) -> Result<Vec<RowId>> {
    rows.into_iter()
        .map(|row| match row.values.first() {
            Some(Value::Int64(v)) => Ok(RowId(*v)),
            _ => Err(Error::msg("Expected a rowid")),
        })
        .collect()
}

impl SqliteStore {
    fn connect(path: Option<&Path>, model: &Model) -> Result<SqliteConnection> {
        let mut connection = SqliteConnection::open(path)?;
        migrate(&mut connection, model)?;
        Ok(connection)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn prepare(
        &mut self,
        entity: &str,
        write: impl FnOnce(&SqliteSqlWriter, &mut String),
    ) -> Result<SqlitePrepared> {
        self.describe(entity)?;
        let mut sql = String::new();
        write(&self.writer, &mut sql);
        self.connection.prepare(&sql)
    }

    fn execute(&mut self, sql: impl FnOnce(&SqliteSqlWriter, &mut String)) -> Result<()> {
        let mut buff = String::new();
        sql(&self.writer, &mut buff);
        self.connection.execute_batch(&buff)
    }
}

impl Store for SqliteStore {
    fn open(config: &Config, model: Model) -> Result<Self> {
        let path = config.database_path();
        let connection = match Self::connect(path.as_deref(), &model) {
            Ok(connection) => connection,
            Err(error) => match (&path, config.recovery) {
                (Some(path), Recovery::Recreate) => {
                    log::warn!(
                        "Discarding the incompatible database `{}` and every row in it: {:#}",
                        path.display(),
                        error
                    );
                    remove_database(path)?;
                    Self::connect(Some(path), &model)
                        .context("Could not recreate the database from empty")?
                }
                _ => return Err(error),
            },
        };
        Ok(Self {
            connection,
            writer: SqliteSqlWriter::default(),
            model,
            path,
        })
    }

    fn model(&self) -> &Model {
        &self.model
    }

    fn fetch(
        &mut self,
        entity: &str,
        filter: Option<&Where>,
        orderby: Option<&Orderby>,
        pager: Option<&Pager>,
    ) -> Result<Vec<StoredRow>> {
        let mut prepared = self.prepare(entity, |w, sql| {
            w.write_select(sql, entity, filter, orderby, pager)
        })?;
        if let Some(filter) = filter {
            prepared.bind_all(filter.args())?;
        }
        prepared.fetch()?.into_iter().map(stored_row).collect()
    }

    fn fetch_id(&mut self, entity: &str, key: &str, id: &str) -> Result<Option<StoredRow>> {
        let mut prepared = self.prepare(entity, |w, sql| w.write_select_id(sql, entity, key))?;
        prepared.bind(&Value::Varchar(id.into()))?;
        fetch_one(prepared)
    }

    fn fetch_row(&mut self, entity: &str, row_id: RowId) -> Result<Option<StoredRow>> {
        let mut prepared = self.prepare(entity, |w, sql| w.write_select_row(sql, entity))?;
        prepared.bind(&Value::Int64(row_id.0))?;
        fetch_one(prepared)
    }

    fn count(&mut self, entity: &str, filter: Option<&Where>) -> Result<u64> {
        let mut prepared = self.prepare(entity, |w, sql| w.write_count(sql, entity, filter))?;
        if let Some(filter) = filter {
            prepared.bind_all(filter.args())?;
        }
        match prepared.fetch()?.first().and_then(|row| row.values.first()) {
            Some(Value::Int64(count)) => Ok(*count as u64),
            _ => Err(Error::msg(format!("Could not count the `{}` rows", entity))),
        }
    }

    fn insert(&mut self, entity: &str, values: &[(&str, Value)]) -> Result<RowId> {
        let mut prepared = self.prepare(entity, |w, sql| {
            w.write_insert(sql, entity, values.iter().map(|(k, _)| *k))
        })?;
        prepared.bind_all(values.iter().map(|(_, v)| v))?.execute()?;
        Ok(self.connection.last_insert_row_id())
    }

    fn delete(&mut self, entity: &str, row_id: RowId) -> Result<u64> {
        let mut prepared = self.prepare(entity, |w, sql| w.write_delete(sql, entity))?;
        prepared.bind(&Value::Int64(row_id.0))?.execute()?;
        Ok(self.connection.changes())
    }

    fn insert_batch(&mut self, entity: &str, records: &[Record]) -> Result<Vec<RowId>> {
        let mut result = Vec::with_capacity(records.len());
        // Consecutive records with the same columns share the statement
        let mut current: Option<(Vec<&String>, SqlitePrepared)> = None;
        for record in records {
            let columns = record.keys().collect::<Vec<_>>();
            let reusable = matches!(&current, Some((previous, _)) if *previous == columns);
            if reusable {
                if let Some((_, prepared)) = &mut current {
                    prepared.reset();
                }
            } else {
                let prepared = self.prepare(entity, |w, sql| {
                    w.write_insert(sql, entity, columns.iter().map(|v| v.as_str()))
                })?;
                current = Some((columns, prepared));
            }
            if let Some((_, prepared)) = &mut current {
                prepared.bind_all(record.values())?.execute()?;
                result.push(self.connection.last_insert_row_id());
            }
        }
        Ok(result)
    }

    fn update_where(&mut self, entity: &str, set: &Record, filter: Option<&Where>) -> Result<u64> {
        let mut prepared = self.prepare(entity, |w, sql| {
            w.write_update_where(sql, entity, set.keys().map(String::as_str), filter)
        })?;
        prepared.bind_all(set.values())?;
        if let Some(filter) = filter {
            prepared.bind_all(filter.args())?;
        }
        prepared.execute()?;
        Ok(self.connection.changes())
    }

    fn delete_where(&mut self, entity: &str, filter: Option<&Where>) -> Result<Vec<RowId>> {
        let mut prepared =
            self.prepare(entity, |w, sql| w.write_delete_where(sql, entity, filter))?;
        if let Some(filter) = filter {
            prepared.bind_all(filter.args())?;
        }
        row_ids(prepared.fetch()?)
    }

    fn begin(&mut self) -> Result<()> {
        self.execute(|w, sql| w.write_transaction_begin(sql))
    }

    fn commit(&mut self) -> Result<()> {
        self.execute(|w, sql| w.write_transaction_commit(sql))
    }

    fn rollback(&mut self) -> Result<()> {
        self.execute(|w, sql| w.write_transaction_rollback(sql))
    }
}
