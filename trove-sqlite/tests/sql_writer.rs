#[cfg(test)]
mod tests {
    use indoc::indoc;
    use trove_core::{ColumnKind, Model, Orderby, Pager, RowId, Where};
    use trove_sqlite::SqliteSqlWriter;

    const WRITER: SqliteSqlWriter = SqliteSqlWriter {};

    #[test]
    fn create() {
        let model = Model::new("library")
            .with_entity("Book")
            .with_column("id", ColumnKind::Integer)
            .with_column("title", ColumnKind::Text)
            .with_column("in \"stock\"", ColumnKind::Boolean)
            .with_column("rating", ColumnKind::Float)
            .with_column("cover", ColumnKind::Blob);
        let book = model.entity("Book").expect("Book is declared");
        {
            let mut out = String::new();
            WRITER.write_create_table(&mut out, book);
            assert_eq!(
                out,
                indoc! {r#"
                    CREATE TABLE IF NOT EXISTS "Book" (
                    "id" INTEGER,
                    "title" TEXT,
                    "in ""stock""" BOOLEAN,
                    "rating" REAL,
                    "cover" BLOB
                    );
                "#}
                .trim()
            );
        }
        {
            let mut out = String::new();
            WRITER.write_add_column(&mut out, "Book", &book.columns[1]);
            WRITER.write_create_index(&mut out, "Book", "id");
            assert_eq!(
                out,
                concat!(
                    r#"ALTER TABLE "Book" ADD COLUMN "title" TEXT;"#,
                    r#"CREATE INDEX IF NOT EXISTS "Book_id" ON "Book" ("id");"#,
                )
            );
        }
        {
            let mut out = String::new();
            WRITER.write_table_info(&mut out, "Book");
            assert_eq!(out, r#"PRAGMA table_info("Book");"#);
        }
    }

    #[test]
    fn select() {
        {
            let mut out = String::new();
            WRITER.write_select(&mut out, "Book", None, None, None);
            assert_eq!(out, r#"SELECT rowid, * FROM "Book";"#);
        }
        {
            let mut out = String::new();
            WRITER.write_select(
                &mut out,
                "Book",
                Some(&Where::with(r#""rating" > ? AND "genre" = ?"#).arg(4).arg(1)),
                Some(&Orderby::descending("rating").then("title", true)),
                Some(&Pager::new(2, 25)),
            );
            assert_eq!(
                out,
                concat!(
                    r#"SELECT rowid, * FROM "Book" WHERE "rating" > ? AND "genre" = ?"#,
                    r#" ORDER BY "rating" DESC, "title" ASC LIMIT 25 OFFSET 50;"#,
                )
            );
        }
        {
            let mut out = String::new();
            WRITER.write_select(&mut out, "Book", None, Some(&Orderby::default()), None);
            assert_eq!(out, r#"SELECT rowid, * FROM "Book";"#);
        }
        {
            let mut out = String::new();
            WRITER.write_select(&mut out, "Book", None, None, Some(&Pager::new(3, u64::MAX)));
            assert_eq!(
                out,
                r#"SELECT rowid, * FROM "Book" LIMIT 9223372036854775807 OFFSET 9223372036854775807;"#
            );
        }
        {
            let mut out = String::new();
            WRITER.write_select_id(&mut out, "Book", "id");
            assert_eq!(out, r#"SELECT rowid, * FROM "Book" WHERE "id" = ? LIMIT 1;"#);
        }
        {
            let mut out = String::new();
            WRITER.write_select_row(&mut out, "Book");
            assert_eq!(out, r#"SELECT rowid, * FROM "Book" WHERE rowid = ?;"#);
        }
        {
            let mut out = String::new();
            WRITER.write_count(&mut out, "Book", Some(&Where::id_equals("id", 3)));
            assert_eq!(out, r#"SELECT COUNT(*) FROM "Book" WHERE "id" = ?;"#);
        }
    }

    #[test]
    fn modify() {
        {
            let mut out = String::new();
            WRITER.write_insert(&mut out, "Book", ["id", "title"].into_iter());
            assert_eq!(out, r#"INSERT INTO "Book" ("id", "title") VALUES (?, ?);"#);
        }
        {
            let mut out = String::new();
            WRITER.write_insert(&mut out, "Book", [].into_iter());
            assert_eq!(out, r#"INSERT INTO "Book" DEFAULT VALUES;"#);
        }
        {
            let mut out = String::new();
            WRITER.write_update_where(
                &mut out,
                "Book",
                ["title", "rating"].into_iter(),
                Some(&Where::row_identity(RowId(4), "id", 12)),
            );
            assert_eq!(
                out,
                r#"UPDATE "Book" SET "title" = ?, "rating" = ? WHERE rowid = ? AND "id" IS ?;"#
            );
        }
        {
            let mut out = String::new();
            WRITER.write_update_where(
                &mut out,
                "Book",
                ["rating"].into_iter(),
                Some(&Where::with(r#""genre" = ?"#).arg(2)),
            );
            assert_eq!(out, r#"UPDATE "Book" SET "rating" = ? WHERE "genre" = ?;"#);
        }
        {
            let mut out = String::new();
            WRITER.write_delete(&mut out, "Book");
            assert_eq!(out, r#"DELETE FROM "Book" WHERE rowid = ?;"#);
        }
        {
            let mut out = String::new();
            WRITER.write_delete_where(&mut out, "Book", None);
            assert_eq!(out, r#"DELETE FROM "Book" RETURNING rowid;"#);
        }
        {
            let mut out = String::new();
            WRITER.write_transaction_begin(&mut out);
            WRITER.write_transaction_commit(&mut out);
            WRITER.write_transaction_rollback(&mut out);
            assert_eq!(out, "BEGIN IMMEDIATE;COMMIT;ROLLBACK;");
        }
    }
}
