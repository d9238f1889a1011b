use std::fmt::Write;
use trove_core::{ColumnKind, ColumnModel, EntityModel, Orderby, Pager, Where};

/// Renders the statements the store runs.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqliteSqlWriter {
    pub fn write_escaped(&self, buff: &mut dyn Write, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                let _ = buff.write_str(&value[position..i]);
                let _ = buff.write_str(replace);
                position = i + c.len_utf8();
            }
        }
        let _ = buff.write_str(&value[position..]);
    }

    pub fn write_identifier_quoted(&self, buff: &mut dyn Write, value: &str) {
        let _ = buff.write_char('"');
        self.write_escaped(buff, value, '"', "\"\"");
        let _ = buff.write_char('"');
    }

    pub fn write_column_type(&self, buff: &mut dyn Write, kind: ColumnKind) {
        let _ = buff.write_str(match kind {
            ColumnKind::Boolean => "BOOLEAN",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Float => "REAL",
            ColumnKind::Text => "TEXT",
            ColumnKind::Blob => "BLOB",
        });
    }

    fn write_column_definition(&self, buff: &mut dyn Write, column: &ColumnModel) {
        self.write_identifier_quoted(buff, &column.name);
        let _ = buff.write_char(' ');
        self.write_column_type(buff, column.kind);
    }

    pub fn write_create_table(&self, buff: &mut dyn Write, entity: &EntityModel) {
        let _ = buff.write_str("CREATE TABLE IF NOT EXISTS ");
        self.write_identifier_quoted(buff, &entity.name);
        let _ = buff.write_str(" (\n");
        for (i, column) in entity.columns.iter().enumerate() {
            if i > 0 {
                let _ = buff.write_str(",\n");
            }
            self.write_column_definition(buff, column);
        }
        let _ = buff.write_str("\n);");
    }

    pub fn write_add_column(&self, buff: &mut dyn Write, entity: &str, column: &ColumnModel) {
        let _ = buff.write_str("ALTER TABLE ");
        self.write_identifier_quoted(buff, entity);
        let _ = buff.write_str(" ADD COLUMN ");
        self.write_column_definition(buff, column);
        let _ = buff.write_char(';');
    }

    pub fn write_create_index(&self, buff: &mut dyn Write, entity: &str, column: &str) {
        let _ = buff.write_str("CREATE INDEX IF NOT EXISTS ");
        self.write_identifier_quoted(buff, &format!("{}_{}", entity, column));
        let _ = buff.write_str(" ON ");
        self.write_identifier_quoted(buff, entity);
        let _ = buff.write_str(" (");
        self.write_identifier_quoted(buff, column);
        let _ = buff.write_str(");");
    }

    pub fn write_table_info(&self, buff: &mut dyn Write, entity: &str) {
        let _ = buff.write_str("PRAGMA table_info(");
        self.write_identifier_quoted(buff, entity);
        let _ = buff.write_str(");");
    }

    fn write_where(&self, buff: &mut dyn Write, filter: Option<&Where>) {
        if let Some(filter) = filter {
            let _ = write!(buff, " WHERE {}", filter.format());
        }
    }

    /// Selects the row identity first, then every column.
    pub fn write_select(
        &self,
        buff: &mut dyn Write,
        entity: &str,
        filter: Option<&Where>,
        orderby: Option<&Orderby>,
        pager: Option<&Pager>,
    ) {
        let _ = buff.write_str("SELECT rowid, * FROM ");
        self.write_identifier_quoted(buff, entity);
        self.write_where(buff, filter);
        if let Some(orderby) = orderby.filter(|v| !v.is_empty()) {
            let _ = buff.write_str(" ORDER BY ");
            for (i, (key, ascending)) in orderby.pairs().iter().enumerate() {
                if i > 0 {
                    let _ = buff.write_str(", ");
                }
                self.write_identifier_quoted(buff, key);
                let _ = buff.write_str(if *ascending { " ASC" } else { " DESC" });
            }
        }
        if let Some(pager) = pager {
            // Sqlite integers are signed
            let _ = write!(
                buff,
                " LIMIT {} OFFSET {}",
                pager.limit().min(i64::MAX as u64),
                pager.offset().min(i64::MAX as u64)
            );
        }
        let _ = buff.write_char(';');
    }

    pub fn write_select_id(&self, buff: &mut dyn Write, entity: &str, key: &str) {
        let _ = buff.write_str("SELECT rowid, * FROM ");
        self.write_identifier_quoted(buff, entity);
        let _ = buff.write_str(" WHERE ");
        self.write_identifier_quoted(buff, key);
        let _ = buff.write_str(" = ? LIMIT 1;");
    }

    pub fn write_select_row(&self, buff: &mut dyn Write, entity: &str) {
        let _ = buff.write_str("SELECT rowid, * FROM ");
        self.write_identifier_quoted(buff, entity);
        let _ = buff.write_str(" WHERE rowid = ?;");
    }

    pub fn write_count(&self, buff: &mut dyn Write, entity: &str, filter: Option<&Where>) {
        let _ = buff.write_str("SELECT COUNT(*) FROM ");
        self.write_identifier_quoted(buff, entity);
        self.write_where(buff, filter);
        let _ = buff.write_char(';');
    }

    pub fn write_insert<'a>(
        &self,
        buff: &mut dyn Write,
        entity: &str,
        columns: impl ExactSizeIterator<Item = &'a str>,
    ) {
        let _ = buff.write_str("INSERT INTO ");
        self.write_identifier_quoted(buff, entity);
        let len = columns.len();
        if len == 0 {
            let _ = buff.write_str(" DEFAULT VALUES;");
            return;
        }
        let _ = buff.write_str(" (");
        for (i, column) in columns.enumerate() {
            if i > 0 {
                let _ = buff.write_str(", ");
            }
            self.write_identifier_quoted(buff, column);
        }
        let _ = buff.write_str(") VALUES (");
        for i in 0..len {
            let _ = buff.write_str(if i == 0 { "?" } else { ", ?" });
        }
        let _ = buff.write_str(");");
    }

    fn write_set<'a>(&self, buff: &mut dyn Write, columns: impl Iterator<Item = &'a str>) {
        let _ = buff.write_str(" SET ");
        for (i, column) in columns.enumerate() {
            if i > 0 {
                let _ = buff.write_str(", ");
            }
            self.write_identifier_quoted(buff, column);
            let _ = buff.write_str(" = ?");
        }
    }

    pub fn write_update_where<'a>(
        &self,
        buff: &mut dyn Write,
        entity: &str,
        columns: impl Iterator<Item = &'a str>,
        filter: Option<&Where>,
    ) {
        let _ = buff.write_str("UPDATE ");
        self.write_identifier_quoted(buff, entity);
        self.write_set(buff, columns);
        self.write_where(buff, filter);
        let _ = buff.write_char(';');
    }

    pub fn write_delete(&self, buff: &mut dyn Write, entity: &str) {
        let _ = buff.write_str("DELETE FROM ");
        self.write_identifier_quoted(buff, entity);
        let _ = buff.write_str(" WHERE rowid = ?;");
    }

    pub fn write_delete_where(&self, buff: &mut dyn Write, entity: &str, filter: Option<&Where>) {
        let _ = buff.write_str("DELETE FROM ");
        self.write_identifier_quoted(buff, entity);
        self.write_where(buff, filter);
        let _ = buff.write_str(" RETURNING rowid;");
    }

    pub fn write_transaction_begin(&self, buff: &mut dyn Write) {
        let _ = buff.write_str("BEGIN IMMEDIATE;");
    }

    pub fn write_transaction_commit(&self, buff: &mut dyn Write) {
        let _ = buff.write_str("COMMIT;");
    }

    pub fn write_transaction_rollback(&self, buff: &mut dyn Write) {
        let _ = buff.write_str("ROLLBACK;");
    }
}
