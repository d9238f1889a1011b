use crate::{CBox, SqlitePrepared, error_message_from_ptr};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI, sqlite3,
    sqlite3_busy_timeout, sqlite3_changes64, sqlite3_close, sqlite3_errmsg, sqlite3_exec,
    sqlite3_finalize, sqlite3_free, sqlite3_last_insert_rowid, sqlite3_open_v2,
    sqlite3_prepare_v2,
};
use std::{
    ffi::{CStr, CString, c_char, c_int},
    path::Path,
    ptr,
};
use trove_core::{Error, ErrorContext, Result, RowId, truncate_long};

const BUSY_TIMEOUT_MS: c_int = 5000;

/// Percent encodes each path segment so that `?` and `#` survive the uri.
pub(crate) fn database_url(path: Option<&Path>) -> String {
    match path {
        Some(path) => {
            let path = path.to_string_lossy();
            let segments = path
                .split('/')
                .map(|v| urlencoding::encode(v).into_owned())
                .collect::<Vec<_>>();
            format!("file:{}?mode=rwc", segments.join("/"))
        }
        None => ":memory:".to_string(),
    }
}

pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteConnection {
    /// Opens (creating it when missing) the database at `path`, or a private
    /// in memory database.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let url = database_url(path);
        let context = || format!("Could not open the sqlite database `{}`", url);
        let c_url = CString::new(url.as_str()).with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        unsafe {
            let rc = sqlite3_open_v2(
                c_url.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_URI,
                ptr::null(),
            );
            if rc != SQLITE_OK {
                let message = if connection.is_null() {
                    "Could not allocate the connection".to_string()
                } else {
                    error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string()
                };
                let error = Error::msg(message).context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            sqlite3_busy_timeout(*connection, BUSY_TIMEOUT_MS);
        }
        log::debug!("Opened the sqlite database `{}`", url);
        Ok(Self { connection })
    }

    /// Runs one or more statements without parameters.
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        log::trace!("{}", truncate_long!(sql));
        let c_sql = CString::new(sql).context("Could not create a CString from the query String")?;
        unsafe {
            let mut message: *mut c_char = ptr::null_mut();
            let rc = sqlite3_exec(
                *self.connection,
                c_sql.as_ptr(),
                None,
                ptr::null_mut(),
                &mut message,
            );
            if rc != SQLITE_OK {
                let text = if message.is_null() {
                    error_message_from_ptr(&sqlite3_errmsg(*self.connection)).to_string()
                } else {
                    CStr::from_ptr(message).to_string_lossy().into_owned()
                };
                sqlite3_free(message as *mut _);
                let error = Error::msg(text)
                    .context(format!("While executing the query:\n{}", truncate_long!(sql)));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(())
    }

    pub fn prepare(&mut self, sql: &str) -> Result<SqlitePrepared> {
        log::trace!("{}", truncate_long!(sql));
        let context = || format!("While preparing the query:\n{}", truncate_long!(sql));
        let c_sql = match CString::new(sql) {
            Ok(v) => v,
            Err(e) => {
                let error =
                    Error::new(e).context("Could not create a CString from the query String");
                log::error!("{:#}", error);
                return Err(error);
            }
        };
        let mut statement = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_finalize(p);
        });
        unsafe {
            let mut tail = ptr::null();
            let rc = sqlite3_prepare_v2(
                *self.connection,
                c_sql.as_ptr(),
                -1,
                &mut *statement,
                &mut tail,
            );
            if rc != SQLITE_OK {
                let error = Error::msg(
                    error_message_from_ptr(&sqlite3_errmsg(*self.connection)).to_string(),
                )
                .context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            if statement.is_null() {
                let error = Error::msg("The query contains no statement").context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            if !tail.is_null()
                && CStr::from_ptr(tail)
                    .to_bytes()
                    .iter()
                    .any(|c| !c.is_ascii_whitespace())
            {
                let error =
                    Error::msg("Cannot prepare more than one statement at a time").context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(SqlitePrepared::new(statement))
    }

    /// Rows modified by the last statement.
    pub fn changes(&self) -> u64 {
        unsafe { sqlite3_changes64(*self.connection) as u64 }
    }

    pub fn last_insert_row_id(&self) -> RowId {
        RowId(unsafe { sqlite3_last_insert_rowid(*self.connection) })
    }
}
