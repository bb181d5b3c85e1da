use tridigit_db::models::{Position, StatisticsSummary, ValidationRecord};

/// Taille de la série de précision glissante.
pub const RECENT_WINDOW: usize = 20;

fn percent(hits: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (hits as f64 * 100.0 / total as f64).round() as u32
    }
}

/// Agrégat complet, recalculé à chaque appel. L'ordre d'entrée est indifférent :
/// les séries sont évaluées par période croissante.
pub fn compute_statistics(
    validations: &[ValidationRecord],
    total_draws: usize,
    total_predictions: usize,
) -> StatisticsSummary {
    let mut records: Vec<&ValidationRecord> = validations.iter().collect();
    records.sort_by(|a, b| a.period.cmp(&b.period));
    let total = records.len();

    let position_rate = |p: Position| percent(records.iter().filter(|r| r.hit(p)).count(), total);
    let any_hits = records.iter().filter(|r| r.any_hit()).count();

    let current_streak = records.iter().rev().take_while(|r| r.any_hit()).count() as u32;

    let mut max_streak = 0u32;
    let mut run = 0u32;
    for r in &records {
        if r.any_hit() {
            run += 1;
            max_streak = max_streak.max(run);
        } else {
            run = 0;
        }
    }

    StatisticsSummary {
        total_draws,
        total_predictions,
        overall_accuracy: percent(any_hits, total),
        hundred_accuracy: position_rate(Position::Hundred),
        ten_accuracy: position_rate(Position::Ten),
        one_accuracy: position_rate(Position::One),
        current_streak,
        max_streak,
        recent_accuracy: recent_accuracy(&records),
    }
}

/// Précision cumulée sur les derniers enregistrements, un point par validation.
fn recent_accuracy(records: &[&ValidationRecord]) -> Vec<u32> {
    let start = records.len().saturating_sub(RECENT_WINDOW);
    let mut hits = 0;
    records[start..]
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if r.any_hit() {
                hits += 1;
            }
            percent(hits, i + 1)
        })
        .collect()
}
