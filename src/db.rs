/*!
SQLite bookkeeping for archived MRT files.

Tracks which MRT files exist for which collector and record type, and the
time span between consecutive files. Conflicting `bgp_data` rows are
replaced; `time_span` updates follow a "largest span wins" policy.
*/
use crate::error::StreamError;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Fixed spacing of RIB dumps, minutes.
const RIB_TIME_SPAN: i64 = 120;

/// One row of the file inventory, as produced by [list_files].
#[derive(Debug, Clone, PartialEq)]
pub struct MrtFileEntry {
    pub project: String,
    pub collector: String,
    pub bgp_type: String,
    pub time_span: i64,
    pub file_time: i64,
    pub file_path: String,
    pub ts: i64,
}

/// Creates the bookkeeping tables if they do not exist and seeds the
/// `bgp_types` inventory. Safe to run on every open; re-running does not
/// duplicate the seeds.
pub fn create_tables(conn: &Connection) -> Result<(), StreamError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS bgp_data (
             collector_id integer,
             type_id integer,
             file_time timestamp,
             file_path text,
             ts timestamp default (strftime('%s', 'now')),
             PRIMARY KEY(collector_id, type_id, file_time)
         );
         CREATE TABLE IF NOT EXISTS collectors (
             id integer PRIMARY KEY,
             project text,
             name text
         );
         CREATE TABLE IF NOT EXISTS bgp_types (
             id integer PRIMARY KEY,
             name text
         );
         CREATE TABLE IF NOT EXISTS time_span (
             collector_id integer,
             bgp_type_id integer,
             time_span integer,
             PRIMARY KEY(collector_id, bgp_type_id)
         );",
    )?;
    conn.execute("INSERT OR IGNORE INTO bgp_types VALUES (1, 'ribs')", [])?;
    conn.execute("INSERT OR IGNORE INTO bgp_types VALUES (2, 'updates')", [])?;
    Ok(())
}

fn find_or_create_collector(
    conn: &Connection,
    project: &str,
    collector: &str,
) -> Result<i64, StreamError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM collectors WHERE project = ?1 AND name = ?2",
            params![project, collector],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    let count: i64 = conn.query_row("SELECT count(*) FROM collectors", [], |row| row.get(0))?;
    let id = count + 1;
    conn.execute(
        "INSERT INTO collectors VALUES (?1, ?2, ?3)",
        params![id, project, collector],
    )?;
    // time span for ribs is constant
    conn.execute(
        "INSERT OR REPLACE INTO time_span VALUES (?1, 1, ?2)",
        params![id, RIB_TIME_SPAN],
    )?;
    Ok(id)
}

/// Records one MRT file in the inventory.
///
/// Returns `Ok(false)` without writing when `bgp_type` is not a known type;
/// the caller's run continues. The updates time span, when provided, only
/// replaces the stored value if it is strictly larger.
pub fn add_mrt_file(
    conn: &Connection,
    file_path: &str,
    project: &str,
    collector: &str,
    bgp_type: &str,
    file_time: i64,
    updates_time_span: Option<i64>,
) -> Result<bool, StreamError> {
    let collector_id = find_or_create_collector(conn, project, collector)?;

    if let Some(span) = updates_time_span {
        let current: Option<i64> = conn
            .query_row(
                "SELECT time_span FROM time_span WHERE collector_id = ?1 AND bgp_type_id = 2",
                params![collector_id],
                |row| row.get(0),
            )
            .optional()?;
        // the largest update time span wins
        if current.is_none_or(|c| c < span) {
            conn.execute(
                "INSERT OR REPLACE INTO time_span VALUES (?1, 2, ?2)",
                params![collector_id, span],
            )?;
        }
    }

    let type_id: Option<i64> = conn
        .query_row(
            "SELECT id FROM bgp_types WHERE name = ?1",
            params![bgp_type],
            |row| row.get(0),
        )
        .optional()?;
    let Some(type_id) = type_id else {
        warn!("bgp type {} not supported, skipping {}", bgp_type, file_path);
        return Ok(false);
    };

    conn.execute(
        "INSERT OR REPLACE INTO bgp_data
             (collector_id, type_id, file_time, file_path)
             VALUES (?1, ?2, ?3, ?4)",
        params![collector_id, type_id, file_time, file_path],
    )?;
    Ok(true)
}

/// Lists every file in the inventory with its collector, type and span.
pub fn list_files(conn: &Connection) -> Result<Vec<MrtFileEntry>, StreamError> {
    let mut stmt = conn.prepare(
        "SELECT collectors.project, collectors.name,
                bgp_types.name, time_span.time_span,
                bgp_data.file_time, bgp_data.file_path, bgp_data.ts
         FROM collectors JOIN bgp_data JOIN bgp_types JOIN time_span
         WHERE bgp_data.collector_id = collectors.id AND
               bgp_data.collector_id = time_span.collector_id AND
               bgp_data.type_id = bgp_types.id AND
               bgp_data.type_id = time_span.bgp_type_id",
    )?;
    let entries = stmt
        .query_map([], |row| {
            Ok(MrtFileEntry {
                project: row.get(0)?,
                collector: row.get(1)?,
                bgp_type: row.get(2)?,
                time_span: row.get(3)?,
                file_time: row.get(4)?,
                file_path: row.get(5)?,
                ts: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<MrtFileEntry>, rusqlite::Error>>()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn updates_span(conn: &Connection, collector_id: i64) -> Option<i64> {
        conn.query_row(
            "SELECT time_span FROM time_span WHERE collector_id = ?1 AND bgp_type_id = 2",
            params![collector_id],
            |row| row.get(0),
        )
        .optional()
        .unwrap()
    }

    #[test]
    fn test_bgp_types_seeded_once() {
        let conn = test_conn();
        // re-running create_tables must not duplicate the seeds
        create_tables(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT id, name FROM bgp_types ORDER BY id")
            .unwrap();
        let types: Vec<(i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            types,
            vec![(1, "ribs".to_string()), (2, "updates".to_string())]
        );
    }

    #[test]
    fn test_add_creates_collector_with_rib_span() {
        let conn = test_conn();
        assert!(add_mrt_file(
            &conn,
            "/data/updates.20150401.gz",
            "ris",
            "rrc06",
            "updates",
            1427846400,
            Some(300),
        )
        .unwrap());

        let rib_span: i64 = conn
            .query_row(
                "SELECT time_span FROM time_span WHERE collector_id = 1 AND bgp_type_id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rib_span, 120);
        assert_eq!(updates_span(&conn, 1), Some(300));
    }

    #[test]
    fn test_largest_time_span_wins() {
        let conn = test_conn();
        let add = |span| {
            add_mrt_file(
                &conn,
                "/data/updates.gz",
                "ris",
                "rrc06",
                "updates",
                1427846400,
                Some(span),
            )
            .unwrap()
        };
        add(100);
        assert_eq!(updates_span(&conn, 1), Some(100));
        add(50);
        assert_eq!(updates_span(&conn, 1), Some(100));
        add(150);
        assert_eq!(updates_span(&conn, 1), Some(150));
    }

    #[test]
    fn test_unsupported_type_skips_write() {
        let conn = test_conn();
        let added = add_mrt_file(
            &conn,
            "/data/mystery.gz",
            "ris",
            "rrc06",
            "tabledump",
            1427846400,
            None,
        )
        .unwrap();
        assert!(!added);

        let rows: i64 = conn
            .query_row("SELECT count(*) FROM bgp_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_bgp_data_replace_on_conflict() {
        let conn = test_conn();
        add_mrt_file(&conn, "/data/a.gz", "ris", "rrc06", "ribs", 1000, None).unwrap();
        add_mrt_file(&conn, "/data/b.gz", "ris", "rrc06", "ribs", 1000, None).unwrap();

        let files = list_files(&conn).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_path, "/data/b.gz");
        assert_eq!(files[0].bgp_type, "ribs");
        assert_eq!(files[0].time_span, 120);
    }

    #[test]
    fn test_list_files_joins_all_tables() {
        let conn = test_conn();
        add_mrt_file(&conn, "/data/a.gz", "ris", "rrc06", "ribs", 1000, None).unwrap();
        add_mrt_file(
            &conn,
            "/data/b.gz",
            "routeviews",
            "route-views.sg",
            "updates",
            2000,
            Some(900),
        )
        .unwrap();

        let files = list_files(&conn).unwrap();
        assert_eq!(files.len(), 2);
        let rv = files
            .iter()
            .find(|f| f.collector == "route-views.sg")
            .unwrap();
        assert_eq!(rv.project, "routeviews");
        assert_eq!(rv.bgp_type, "updates");
        assert_eq!(rv.time_span, 900);
        assert_eq!(rv.file_time, 2000);
    }
}
