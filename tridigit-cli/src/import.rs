use std::path::Path;

use anyhow::{Context, Result};
use tridigit_db::db::upsert_draw;
use tridigit_db::models::Draw;
use tridigit_db::rusqlite::Connection;

/// Sort d'une ligne du fichier texte `période centaines dizaines unités`.
#[derive(Debug, PartialEq)]
pub enum LineOutcome {
    Parsed(Draw),
    /// Ligne vide, en-tête ou champs non numériques.
    Skipped,
    /// Champs numériques hors 0-9.
    Rejected,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub total_lines: usize,
    pub imported: usize,
    /// Parmi les importés, ceux qui remplacent une période existante.
    pub replaced: usize,
    pub skipped: usize,
    pub rejected: usize,
}

impl ImportResult {
    pub fn is_success(&self) -> bool {
        self.imported > 0
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

pub fn parse_line(line: &str) -> LineOutcome {
    let fields: Vec<&str> = line.split(is_separator).filter(|f| !f.is_empty()).collect();
    if fields.len() < 4 {
        return LineOutcome::Skipped;
    }
    let mut digits = [0u8; 3];
    for (slot, raw) in digits.iter_mut().zip(&fields[1..4]) {
        match raw.parse::<i64>() {
            Ok(v) if (0..=9).contains(&v) => *slot = v as u8,
            Ok(_) => return LineOutcome::Rejected,
            Err(_) => return LineOutcome::Skipped,
        }
    }
    match Draw::new(fields[0], digits[0], digits[1], digits[2]) {
        Ok(draw) => LineOutcome::Parsed(draw),
        Err(_) => LineOutcome::Rejected,
    }
}

/// Analyse un texte complet ; les lignes vides ne sont pas comptées.
pub fn parse_text(text: &str) -> (Vec<Draw>, ImportResult) {
    let mut result = ImportResult::default();
    let mut draws = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        result.total_lines += 1;
        match parse_line(line) {
            LineOutcome::Parsed(draw) => draws.push(draw),
            LineOutcome::Skipped => {
                tracing::debug!(line = n + 1, "ligne ignorée");
                result.skipped += 1;
            }
            LineOutcome::Rejected => {
                tracing::warn!(line = n + 1, content = line, "chiffres hors plage, ligne rejetée");
                result.rejected += 1;
            }
        }
    }
    (draws, result)
}

/// Import dans une transaction unique : en cas d'erreur rien n'est écrit.
pub fn import_text(conn: &Connection, text: &str) -> Result<ImportResult> {
    let (draws, mut result) = parse_text(text);

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    for draw in &draws {
        if !upsert_draw(&tx, draw)? {
            result.replaced += 1;
        }
        result.imported += 1;
    }
    tx.commit().context("Échec du commit")?;
    Ok(result)
}

pub fn import_file(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    import_text(conn, &text)
}

pub fn export_text(draws: &[Draw]) -> String {
    let mut out = String::new();
    for draw in draws {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            draw.period, draw.digits[0], draw.digits[1], draw.digits[2]
        ));
    }
    out
}

pub fn export_file(draws: &[Draw], path: &Path) -> Result<()> {
    std::fs::write(path, export_text(draws))
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tridigit_db::db::{count_draws, fetch_all_draws, migrate};
    use tridigit_db::store::DrawStore;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_parse_line_separators() {
        for line in ["2024001 1 2 3", "2024001,1,2,3", "2024001\t1\t2\t3", "2024001, 1 ,2\t 3"] {
            match parse_line(line) {
                LineOutcome::Parsed(d) => {
                    assert_eq!(d.period, "2024001");
                    assert_eq!(d.digits, [1, 2, 3]);
                }
                other => panic!("{:?} pour {:?}", other, line),
            }
        }
    }

    #[test]
    fn test_parse_line_skip_and_reject() {
        assert_eq!(parse_line("période centaines dizaines unités"), LineOutcome::Skipped);
        assert_eq!(parse_line("2024001 1 2"), LineOutcome::Skipped);
        assert_eq!(parse_line("2024001 1 x 3"), LineOutcome::Skipped);
        assert_eq!(parse_line("2024001 1 12 3"), LineOutcome::Rejected);
        assert_eq!(parse_line("2024001 -1 2 3"), LineOutcome::Rejected);
    }

    #[test]
    fn test_parse_text_counts() {
        let text = "période,c,d,u\n001 1 2 3\n\n002 4 5 6\n003 4 15 6\n";
        let (draws, result) = parse_text(text);
        assert_eq!(draws.len(), 2);
        assert_eq!(result.total_lines, 4);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.rejected, 1);
    }

    #[test]
    fn test_duplicate_line_single_draw() {
        let text = "001 1 2 3\n001 1 2 3\n";
        let (draws, _) = parse_text(text);
        let store = DrawStore::from_draws(draws);
        assert_eq!(store.len(), 1);

        let conn = memory_db();
        let result = import_text(&conn, text).unwrap();
        assert!(result.is_success());
        assert_eq!(result.imported, 2);
        assert_eq!(result.replaced, 1);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_import_nothing_is_failure() {
        let conn = memory_db();
        let result = import_text(&conn, "rien d'utile\n").unwrap();
        assert!(!result.is_success());
        assert_eq!(count_draws(&conn).unwrap(), 0);
    }

    #[test]
    fn test_export_then_import() {
        let conn = memory_db();
        import_text(&conn, "002 4 5 6\n001 1 2 3\n").unwrap();
        let draws = fetch_all_draws(&conn).unwrap();
        let text = export_text(&draws);
        assert_eq!(text, "001\t1\t2\t3\n002\t4\t5\t6\n");
    }
}
