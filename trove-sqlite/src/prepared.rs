use crate::{
    CBox, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use libsqlite3_sys::*;
use std::{
    ffi::{CStr, c_int},
    fmt::{self, Display},
    os::raw::{c_char, c_void},
    sync::Arc,
};
use trove_core::{Error, Result, Row, Value, truncate_long};

/// Compiled statement with its next positional parameter.
pub struct SqlitePrepared {
    pub(crate) statement: CBox<*mut sqlite3_stmt>,
    pub(crate) index: c_int,
}

impl SqlitePrepared {
    pub(crate) fn new(prepared: CBox<*mut sqlite3_stmt>) -> Self {
        unsafe {
            sqlite3_clear_bindings(*prepared);
        }
        Self {
            statement: prepared,
            index: 1,
        }
    }

    fn error(&self, context: impl Display) -> Error {
        unsafe {
            let db = sqlite3_db_handle(*self.statement);
            let query = sqlite3_sql(*self.statement);
            let query = if query.is_null() {
                String::new()
            } else {
                CStr::from_ptr(query).to_string_lossy().into_owned()
            };
            let error = Error::msg(error_message_from_ptr(&sqlite3_errmsg(db)).to_string())
                .context(format!("{}:\n{}", context, truncate_long!(query)));
            log::error!("{:#}", error);
            error
        }
    }

    /// Binds the next positional parameter.
    pub fn bind(&mut self, value: &Value) -> Result<&mut Self> {
        let index = self.index;
        unsafe {
            let rc = match value {
                Value::Null => sqlite3_bind_null(*self.statement, index),
                Value::Boolean(v) => sqlite3_bind_int(*self.statement, index, *v as c_int),
                Value::Int64(v) => sqlite3_bind_int64(*self.statement, index, *v),
                Value::Float64(v) => sqlite3_bind_double(*self.statement, index, *v),
                Value::Varchar(v) => sqlite3_bind_text(
                    *self.statement,
                    index,
                    v.as_ptr() as *const c_char,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                // A null pointer would bind NULL instead of an empty blob
                Value::Blob(v) if v.is_empty() => sqlite3_bind_zeroblob(*self.statement, index, 0),
                Value::Blob(v) => sqlite3_bind_blob(
                    *self.statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::List(..) | Value::Map(..) => {
                    let v = value.to_json_bytes()?;
                    sqlite3_bind_blob(
                        *self.statement,
                        index,
                        v.as_ptr() as *const c_void,
                        v.len() as c_int,
                        SQLITE_TRANSIENT(),
                    )
                }
            };
            if rc != SQLITE_OK {
                return Err(self.error(format_args!("Cannot bind parameter {} to query", index)));
            }
        }
        self.index = index + 1;
        Ok(self)
    }

    pub fn bind_all<'a>(&mut self, values: impl IntoIterator<Item = &'a Value>) -> Result<&mut Self> {
        for value in values {
            self.bind(value)?;
        }
        Ok(self)
    }

    /// Runs the statement to completion, collecting the rows it yields.
    pub fn fetch(&mut self) -> Result<Vec<Row>> {
        unsafe {
            let count = sqlite3_column_count(*self.statement);
            let labels = (0..count)
                .map(|i| extract_name(*self.statement, i))
                .collect::<Result<Arc<[_]>>>()?;
            let mut rows = Vec::new();
            loop {
                match sqlite3_step(*self.statement) {
                    SQLITE_DONE => {
                        break;
                    }
                    SQLITE_ROW => {
                        rows.push(Row::new(
                            labels.clone(),
                            (0..count)
                                .map(|i| extract_value(*self.statement, i))
                                .collect::<Result<_>>()?,
                        ));
                    }
                    _ => {
                        let error = self.error("While running the query");
                        sqlite3_reset(*self.statement);
                        return Err(error);
                    }
                }
            }
            Ok(rows)
        }
    }

    /// Runs the statement to completion, discarding any row.
    pub fn execute(&mut self) -> Result<()> {
        unsafe {
            loop {
                match sqlite3_step(*self.statement) {
                    SQLITE_DONE => return Ok(()),
                    SQLITE_ROW => continue,
                    _ => {
                        let error = self.error("While running the query");
                        sqlite3_reset(*self.statement);
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Makes the statement runnable again with new parameters.
    pub fn reset(&mut self) -> &mut Self {
        unsafe {
            sqlite3_reset(*self.statement);
            sqlite3_clear_bindings(*self.statement);
        }
        self.index = 1;
        self
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:p}", *self.statement)
    }
}
