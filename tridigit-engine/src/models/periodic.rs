use tridigit_db::models::{Draw, Position, DIGIT_COUNT};
use super::{Signal, SignalContext, SignalKind, SignalModel};

const MIN_APPEARANCES: usize = 3;
/// Stabilité = max(0, STABILITY_BASE - écart-type des intervalles).
const STABILITY_BASE: f64 = 5.0;
const MIN_STABILITY: f64 = 2.0;
/// Écart toléré entre l'intervalle en cours et l'intervalle moyen.
const INTERVAL_TOLERANCE: f64 = 2.0;
const BONUS_FACTOR: f64 = 1.5;

pub struct PeriodicModel {
    weight: f64,
}

impl PeriodicModel {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

/// Bonus par chiffre pour une position : cycle d'apparition régulier dont
/// l'échéance tombe au prochain tirage.
pub fn periodic_bonus(draws: &[Draw], position: Position) -> [f64; DIGIT_COUNT] {
    let mut appearances: [Vec<usize>; DIGIT_COUNT] = Default::default();
    for (i, draw) in draws.iter().enumerate() {
        appearances[position.digit_of(draw) as usize].push(i);
    }

    let mut bonus = [0.0; DIGIT_COUNT];
    for (d, idx) in appearances.iter().enumerate() {
        if idx.len() < MIN_APPEARANCES {
            continue;
        }
        let intervals: Vec<f64> = idx.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
        let variance = intervals.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
        let stability = (STABILITY_BASE - variance.sqrt()).max(0.0);

        // retard en cours, tirage courant inclus
        let missing = (draws.len() - 1 - idx[idx.len() - 1]) as f64;
        if stability > MIN_STABILITY && (missing - mean).abs() <= INTERVAL_TOLERANCE {
            bonus[d] = BONUS_FACTOR * stability;
        }
    }
    bonus
}

impl SignalModel for PeriodicModel {
    fn name(&self) -> &str {
        "Périodicité"
    }

    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Bonus, self.weight);
        for p in Position::ALL {
            signal.votes[p.index()] = periodic_bonus(ctx.draws, p);
        }
        signal
    }
}
