//! Database handle and execution adapter.
//!
//! A `CatalogDb` wraps a read-only rusqlite connection over a database image
//! that was loaded fully into memory. The engine wants a file path, so the
//! image is spooled into a private temp file whose lifetime is tied to the
//! handle. Loads run on a worker thread and carry a generation number so a
//! superseded load arriving late is discarded instead of clobbering a newer
//! handle.

use crate::data::result_set::{CellValue, ResultSet};
use anyhow::{anyhow, Result};
use rusqlite::{Connection, OpenFlags};
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use tempfile::NamedTempFile;

/// Open database handle plus the load generation that produced it
pub struct CatalogDb {
    conn: Connection,
    generation: u64,
    // Backing file for the in-memory image; dropped with the handle
    _image: NamedTempFile,
}

/// Completion message from a background load
pub struct LoadOutcome {
    pub generation: u64,
    pub result: Result<CatalogDb>,
    pub source: PathBuf,
}

impl CatalogDb {
    /// Construct a handle from a database image held in memory
    pub fn from_bytes(bytes: &[u8], generation: u64) -> Result<Self> {
        let mut image = NamedTempFile::new()?;
        image.write_all(bytes)?;
        image.flush()?;

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(image.path(), flags)?;

        tracing::info!(target: "db", "database image loaded ({} bytes)", bytes.len());
        Ok(Self {
            conn,
            generation,
            _image: image,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Execute command text and collect its result sets.
    ///
    /// A statement contributes a result set only when it returns rows, so a
    /// zero-row SELECT produces nothing here and surfaces as "no results"
    /// one level up.
    pub fn execute(&self, command: &str) -> Result<Vec<ResultSet>> {
        let mut results = Vec::new();

        for statement in split_statements(command) {
            tracing::debug!(target: "query", "executing: {}", statement);
            let mut stmt = self.conn.prepare(&statement)?;

            if stmt.column_count() == 0 {
                // Not row-returning; the read-only connection rejects writes
                stmt.execute([])?;
                continue;
            }

            let columns: Vec<String> = stmt
                .column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();

            let mut rows = Vec::new();
            let mut query_rows = stmt.query([])?;
            while let Some(row) = query_rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    values.push(read_cell(row, i)?);
                }
                rows.push(values);
            }

            if !rows.is_empty() {
                results.push(ResultSet::new(columns, rows));
            }
        }

        Ok(results)
    }

    /// Run one command under the single-result-set contract.
    ///
    /// Zero result sets is an error; more than one is a non-fatal warning and
    /// the first result set is still returned.
    pub fn run_command(&self, command: &str) -> Result<(ResultSet, Option<String>)> {
        let mut results = self.execute(command)?;

        match results.len() {
            0 => Err(anyhow!("No results returned")),
            1 => Ok((results.remove(0), None)),
            n => {
                tracing::warn!(target: "query", "command produced {} result sets", n);
                Ok((
                    results.remove(0),
                    Some(format!(
                        "{} result sets returned - run one command at a time; showing the first",
                        n
                    )),
                ))
            }
        }
    }
}

fn read_cell(row: &rusqlite::Row, idx: usize) -> Result<CellValue> {
    use rusqlite::types::ValueRef;

    let value = match row.get_ref(idx)? {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(r) => CellValue::Real(r),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => CellValue::Text(String::from_utf8_lossy(b).to_string()),
    };
    Ok(value)
}

/// Split command text into statements on `;`, honoring quoted strings.
/// Empty statements (stray terminators, trailing whitespace) are dropped.
pub fn split_statements(command: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in command.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                ';' => {
                    if !current.trim().is_empty() {
                        statements.push(current.trim().to_string());
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}

/// Read a database file into memory on a worker thread and construct a handle
/// from the bytes. The completion message carries the generation so the
/// receiver can discard a load that was superseded while in flight.
pub fn spawn_load(path: PathBuf, generation: u64, tx: Sender<LoadOutcome>) {
    std::thread::spawn(move || {
        tracing::info!(target: "db", "loading database file {:?}", path);
        let result = std::fs::read(&path)
            .map_err(|e| anyhow!("Failed to read {:?}: {}", path, e))
            .and_then(|bytes| CatalogDb::from_bytes(&bytes, generation));

        // Receiver gone means the app exited mid-load
        let _ = tx.send(LoadOutcome {
            generation,
            result,
            source: path,
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db_bytes() -> Vec<u8> {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Catalog (
                "File Name" TEXT,
                "Relative Path" TEXT,
                "Extension" TEXT,
                "File Size" INTEGER,
                "Checksum" TEXT,
                "Unique Id" TEXT,
                "Link Path" TEXT
            );
            INSERT INTO Catalog VALUES
                ('a.pdf', 'docs/a.pdf', '.pdf', 100, 'c1', 'k1', 'file:///docs/a.pdf'),
                ('b.doc', 'docs/b.doc', '.doc', 200, 'c2', 'k2', 'file:///docs/b.doc'),
                ('a copy.pdf', 'old/a copy.pdf', '.pdf', 100, 'c1', 'k3', 'file:///old/a copy.pdf');
            "#,
        )
        .unwrap();
        drop(conn);
        std::fs::read(file.path()).unwrap()
    }

    #[test]
    fn loads_image_from_bytes_and_queries() {
        let db = CatalogDb::from_bytes(&sample_db_bytes(), 1).unwrap();
        let (rs, warning) = db
            .run_command("SELECT * FROM Catalog ORDER BY \"File Name\";")
            .unwrap();
        assert!(warning.is_none());
        assert_eq!(rs.row_count(), 3);
        assert_eq!(rs.columns[0], "File Name");
        assert_eq!(rs.cell_text(0, 0), "a copy.pdf");
    }

    #[test]
    fn zero_row_select_is_no_results() {
        let db = CatalogDb::from_bytes(&sample_db_bytes(), 1).unwrap();
        let err = db
            .run_command("SELECT * FROM Catalog WHERE \"File Name\" = 'missing';")
            .unwrap_err();
        assert!(err.to_string().contains("No results"), "{}", err);
    }

    #[test]
    fn multi_statement_warns_and_returns_first() {
        let db = CatalogDb::from_bytes(&sample_db_bytes(), 1).unwrap();
        let (rs, warning) = db
            .run_command(
                "SELECT \"File Name\" FROM Catalog; SELECT \"Checksum\" FROM Catalog;",
            )
            .unwrap();
        assert!(warning.unwrap().contains("one command at a time"));
        assert_eq!(rs.columns, vec!["File Name".to_string()]);
    }

    #[test]
    fn engine_failure_surfaces_engine_message() {
        let db = CatalogDb::from_bytes(&sample_db_bytes(), 1).unwrap();
        let err = db.run_command("SELECT * FROM NoSuchTable;").unwrap_err();
        assert!(err.to_string().contains("NoSuchTable"), "{}", err);
    }

    #[test]
    fn writes_are_rejected_read_only() {
        let db = CatalogDb::from_bytes(&sample_db_bytes(), 1).unwrap();
        assert!(db.execute("DELETE FROM Catalog;").is_err());
    }

    #[test]
    fn splits_on_terminator_but_not_inside_quotes() {
        let statements = split_statements(
            "SELECT 'a;b' FROM t; SELECT \"x;y\" FROM u;;  ",
        );
        assert_eq!(
            statements,
            vec![
                "SELECT 'a;b' FROM t".to_string(),
                "SELECT \"x;y\" FROM u".to_string(),
            ]
        );
    }

    #[test]
    fn stale_generation_is_observable() {
        let db = CatalogDb::from_bytes(&sample_db_bytes(), 7).unwrap();
        assert_eq!(db.generation(), 7);
    }

    #[test]
    fn background_load_reports_generation() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), sample_db_bytes()).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        spawn_load(file.path().to_path_buf(), 3, tx);

        let outcome = rx.recv().unwrap();
        assert_eq!(outcome.generation, 3);
        assert!(outcome.result.is_ok());
    }
}
