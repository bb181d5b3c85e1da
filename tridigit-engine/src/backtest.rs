use chrono::{DateTime, Utc};

use tridigit_db::models::{Draw, ValidationRecord};

use crate::config::EngineConfig;
use crate::predictor::Predictor;
use crate::validation::build_record;

/// Évaluation walk-forward sur les `last` tirages les plus récents.
/// Chaque tirage test est prédit uniquement à partir des tirages qui le précèdent.
pub fn backtest(draws: &[Draw], window: usize, last: usize, config: &EngineConfig) -> Vec<ValidationRecord> {
    backtest_with(draws, window, last, config, |_, _| {})
}

/// `on_step(fait, total)` est appelé après chaque tirage test.
pub fn backtest_with(
    draws: &[Draw],
    window: usize,
    last: usize,
    config: &EngineConfig,
    mut on_step: impl FnMut(usize, usize),
) -> Vec<ValidationRecord> {
    let predictor = Predictor::new(config.clone());
    let start = draws.len().saturating_sub(last).max(config.min_draws);
    let total = draws.len().saturating_sub(start);
    let stamp: DateTime<Utc> = Utc::now();

    let mut records = Vec::with_capacity(total);
    for (step, t) in (start..draws.len()).enumerate() {
        // historique strictement antérieur au tirage test
        let history = &draws[..t];
        if let Some(prediction) = predictor.predict_at(history, window, stamp) {
            records.push(build_record(&prediction, &draws[t], config.hit_threshold, stamp));
        }
        on_step(step + 1, total);
    }

    tracing::info!(tests = records.len(), window, "backtest terminé");
    records
}
