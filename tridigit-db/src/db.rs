use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::{validate_digits, Draw, Prediction, ValidationRecord};
use crate::store::DrawStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    period   TEXT PRIMARY KEY,
    id       TEXT NOT NULL,
    hundred  INTEGER NOT NULL,
    ten      INTEGER NOT NULL,
    one      INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS predictions (
    period        TEXT PRIMARY KEY,
    generated_at  TEXT NOT NULL,
    payload       TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS validations (
    period        TEXT PRIMARY KEY,
    validated_at  TEXT NOT NULL,
    payload       TEXT NOT NULL
);
";

/// `TRIDIGIT_DB` si défini, sinon `./data/tridigit.db`.
pub fn db_path() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("TRIDIGIT_DB") {
        return std::path::PathBuf::from(path);
    }
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("tridigit.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    tracing::debug!(path = %path.display(), "base ouverte");
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Insère ou remplace le tirage de cette période. Retourne `true` si la période était nouvelle.
pub fn upsert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let existed: bool = conn
        .query_row(
            "SELECT 1 FROM draws WHERE period = ?1",
            [&draw.period],
            |_| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    conn.execute(
        "INSERT OR REPLACE INTO draws (period, id, hundred, ten, one) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![draw.period, draw.id, draw.digits[0], draw.digits[1], draw.digits[2]],
    ).context("Échec de l'insertion")?;
    Ok(!existed)
}

pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT id, period, hundred, ten, one FROM draws ORDER BY period ASC"
    )?;
    let draws = stmt.query_map([], |row| {
        Ok(Draw {
            id: row.get(0)?,
            period: row.get(1)?,
            digits: [
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
            ],
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    for draw in &draws {
        validate_digits(&draw.digits)
            .with_context(|| format!("Tirage invalide en base pour la période {}", draw.period))?;
    }
    Ok(draws)
}

pub fn load_store(conn: &Connection) -> Result<DrawStore> {
    Ok(DrawStore::from_draws(fetch_all_draws(conn)?))
}

pub fn count_draws(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn delete_draw(conn: &Connection, period: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM draws WHERE period = ?1", [period])?;
    Ok(changed > 0)
}

pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute_batch("DELETE FROM draws; DELETE FROM predictions; DELETE FROM validations;")
        .context("Échec du nettoyage")?;
    Ok(())
}

/// Une nouvelle prédiction remplace l'ancienne pour la même période.
pub fn save_prediction(conn: &Connection, prediction: &Prediction) -> Result<()> {
    let payload = serde_json::to_string(prediction)?;
    conn.execute(
        "INSERT OR REPLACE INTO predictions (period, generated_at, payload) VALUES (?1, ?2, ?3)",
        rusqlite::params![prediction.period, prediction.generated_at.to_rfc3339(), payload],
    ).context("Échec de l'enregistrement de la prédiction")?;
    Ok(())
}

pub fn fetch_predictions(conn: &Connection) -> Result<Vec<Prediction>> {
    let mut stmt = conn.prepare("SELECT payload FROM predictions ORDER BY period ASC")?;
    let payloads = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    payloads
        .iter()
        .map(|p| serde_json::from_str(p).context("Prédiction illisible"))
        .collect()
}

pub fn count_predictions(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn save_validation(conn: &Connection, record: &ValidationRecord) -> Result<()> {
    let payload = serde_json::to_string(record)?;
    conn.execute(
        "INSERT OR REPLACE INTO validations (period, validated_at, payload) VALUES (?1, ?2, ?3)",
        rusqlite::params![record.period, record.validated_at.to_rfc3339(), payload],
    ).context("Échec de l'enregistrement de la validation")?;
    Ok(())
}

pub fn fetch_validations(conn: &Connection) -> Result<Vec<ValidationRecord>> {
    let mut stmt = conn.prepare("SELECT payload FROM validations ORDER BY period ASC")?;
    let payloads = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    payloads
        .iter()
        .map(|p| serde_json::from_str(p).context("Validation illisible"))
        .collect()
}

/// Ne garde que les `keep` validations les plus récentes (par période).
pub fn trim_validations(conn: &Connection, keep: usize) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM validations WHERE period NOT IN
         (SELECT period FROM validations ORDER BY period DESC LIMIT ?1)",
        [keep as i64],
    )?;
    if removed > 0 {
        tracing::debug!(removed, keep, "validations tronquées");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DigitScore, PredictionRecord};
    use chrono::{DateTime, Utc};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn test_validation(period: &str) -> ValidationRecord {
        ValidationRecord {
            period: period.to_string(),
            prediction: PredictionRecord {
                period: period.to_string(),
                predicted_at: DateTime::<Utc>::default(),
                window_size: 30,
                rankings: [vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]],
                confidence: 40,
            },
            actual: [1, 5, 0],
            hits: [true, true, false],
            ranks: [1, 2, 11],
            validated_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn test_insert_and_count() {
        let conn = test_conn();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        upsert_draw(&conn, &Draw::new("001", 1, 2, 3).unwrap()).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_replaced() {
        let conn = test_conn();

        let inserted = upsert_draw(&conn, &Draw::new("001", 1, 2, 3).unwrap()).unwrap();
        assert!(inserted);
        let inserted = upsert_draw(&conn, &Draw::new("001", 7, 8, 9).unwrap()).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
        assert_eq!(fetch_all_draws(&conn).unwrap()[0].digits, [7, 8, 9]);
    }

    #[test]
    fn test_fetch_order() {
        let conn = test_conn();

        upsert_draw(&conn, &Draw::new("001", 1, 1, 1).unwrap()).unwrap();
        upsert_draw(&conn, &Draw::new("003", 3, 3, 3).unwrap()).unwrap();
        upsert_draw(&conn, &Draw::new("002", 2, 2, 2).unwrap()).unwrap();

        let store = load_store(&conn).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.draws()[0].period, "001");
        assert_eq!(store.draws()[2].period, "003");
    }

    #[test]
    fn test_fetch_rejects_out_of_range_digit() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO draws (period, id, hundred, ten, one) VALUES ('001', 'x', 1, 12, 3)",
            [],
        ).unwrap();
        assert!(fetch_all_draws(&conn).is_err());
        assert!(load_store(&conn).is_err());
    }

    #[test]
    fn test_delete_and_clear() {
        let conn = test_conn();
        upsert_draw(&conn, &Draw::new("001", 1, 1, 1).unwrap()).unwrap();
        upsert_draw(&conn, &Draw::new("002", 2, 2, 2).unwrap()).unwrap();

        assert!(delete_draw(&conn, "001").unwrap());
        assert!(!delete_draw(&conn, "001").unwrap());
        clear_all(&conn).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 0);
    }

    #[test]
    fn test_prediction_roundtrip() {
        let conn = test_conn();
        let prediction = Prediction {
            period: "002".to_string(),
            window_size: 10,
            hundred: vec![DigitScore { digit: 3, score: 1.5, probability: 100 }],
            ten: vec![],
            one: vec![],
            combined: vec![],
            overall_confidence: 42,
            pattern_matches: vec![],
            generated_at: DateTime::<Utc>::default(),
        };
        save_prediction(&conn, &prediction).unwrap();
        save_prediction(&conn, &prediction).unwrap();

        assert_eq!(count_predictions(&conn).unwrap(), 1);
        assert_eq!(fetch_predictions(&conn).unwrap()[0], prediction);
    }

    #[test]
    fn test_trim_validations() {
        let conn = test_conn();
        for i in 0..5 {
            save_validation(&conn, &test_validation(&format!("{:03}", i))).unwrap();
        }
        let removed = trim_validations(&conn, 3).unwrap();
        assert_eq!(removed, 2);

        let records = fetch_validations(&conn).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].period, "002");
        assert_eq!(records[2].ranks, [1, 2, 11]);
    }
}
