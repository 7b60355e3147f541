use std::path::Path;

use log::debug;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Params};

use super::model::{CellValue, Column, Table};
use crate::error::{Error, Result};

/// Run a query against an existing SQLite database and return the result
/// set column by column.
///
/// The database is opened read-only, so a missing file is reported rather
/// than silently created.
///
/// # Errors
///
/// Returns an error if the file does not exist, if the SQL fails to prepare,
/// or if a row cannot be read.
pub fn query_sqlite<P: Params>(db_path: &Path, sql: &str, params: P) -> Result<Table> {
    if !db_path.is_file() {
        return Err(Error::DocumentNotFound {
            path: db_path.to_path_buf(),
        });
    }

    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(sql)?;
    let mut columns: Vec<Column> = stmt.column_names().into_iter().map(Column::new).collect();

    let mut rows = stmt.query(params)?;
    while let Some(row) = rows.next()? {
        for (i, column) in columns.iter_mut().enumerate() {
            column.values.push(cell_from_sql(row.get_ref(i)?));
        }
    }

    debug!("{}: '{}' returned {} column(s)", db_path.display(), sql, columns.len());
    Table::from_columns(columns)
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Float(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Text(format!("<blob {} bytes>", bytes.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn inventory_db(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("inventory.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE inventory (id INTEGER PRIMARY KEY, item TEXT, weight REAL, note BLOB);
             INSERT INTO inventory (item, weight, note) VALUES ('shoes', 1.5, NULL);
             INSERT INTO inventory (item, weight, note) VALUES ('coffee', 2.1, x'0102');
             INSERT INTO inventory (item, weight, note) VALUES ('books', 3.2, NULL);",
        )
        .unwrap();
        path
    }

    #[test]
    fn query_returns_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = inventory_db(&dir);

        let table = query_sqlite(&path, "SELECT id, item, weight, note FROM inventory ORDER BY id", []).unwrap();
        assert_eq!(table.column_names(), vec!["id", "item", "weight", "note"]);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.row(1).unwrap(),
            vec![
                &CellValue::Integer(2),
                &CellValue::Text("coffee".into()),
                &CellValue::Float(2.1),
                &CellValue::Text("<blob 2 bytes>".into()),
            ]
        );
        assert!(table.row(0).unwrap()[3].is_null());
    }

    #[test]
    fn query_with_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = inventory_db(&dir);

        let table = query_sqlite(
            &path,
            "SELECT item FROM inventory WHERE weight > ?1 ORDER BY weight",
            params![2.0],
        )
        .unwrap();
        let items: Vec<&str> = table.columns[0].values.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(items, vec!["coffee", "books"]);
    }

    #[test]
    fn empty_result_keeps_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = inventory_db(&dir);

        let table = query_sqlite(&path, "SELECT item FROM inventory WHERE 0", []).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names(), vec!["item"]);
    }

    #[test]
    fn missing_database_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");

        let err = query_sqlite(&path, "SELECT 1", []).unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn bad_sql_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = inventory_db(&dir);
        assert!(matches!(
            query_sqlite(&path, "SELECT nope FROM nowhere", []),
            Err(Error::Sqlite(_))
        ));
    }
}
