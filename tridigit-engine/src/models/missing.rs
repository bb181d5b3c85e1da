use tridigit_db::models::{Draw, Position, DIGIT_COUNT};
use super::{Signal, SignalContext, SignalKind, SignalModel};

pub struct MissingValueModel {
    weight: f64,
}

impl MissingValueModel {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

/// Tirages écoulés depuis la dernière sortie de chaque chiffre à cette position,
/// tirage courant inclus (le chiffre courant vaut 0). Jamais vu : `draws.len()`.
pub fn position_missing(draws: &[Draw], position: Position) -> [u32; DIGIT_COUNT] {
    let mut missing = [draws.len() as u32; DIGIT_COUNT];
    let mut seen = [false; DIGIT_COUNT];
    for (age, draw) in draws.iter().rev().enumerate() {
        let d = position.digit_of(draw) as usize;
        if !seen[d] {
            seen[d] = true;
            missing[d] = age as u32;
        }
    }
    missing
}

/// Bonus croissant puis plafonné.
pub fn due_bonus(missing: u32, step: f64, cap: f64) -> f64 {
    (missing as f64 * step).min(cap)
}

impl SignalModel for MissingValueModel {
    fn name(&self) -> &str {
        "Retard"
    }

    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Bonus, self.weight);
        if ctx.draws.is_empty() {
            return signal;
        }
        let (step, cap) = (ctx.config.missing_step, ctx.config.missing_cap);
        for p in Position::ALL {
            let missing = position_missing(ctx.draws, p);
            for (d, &m) in missing.iter().enumerate() {
                signal.votes[p.index()][d] = due_bonus(m, step, cap);
            }
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_position_missing() {
        let draws: Vec<Draw> = [4u8, 7, 4, 2]
            .iter()
            .enumerate()
            .map(|(i, &h)| Draw::new(format!("{:03}", i), h, 0, 0).unwrap())
            .collect();
        let missing = position_missing(&draws, Position::Hundred);
        assert_eq!(missing[2], 0);
        assert_eq!(missing[4], 1);
        assert_eq!(missing[7], 2);
        assert_eq!(missing[9], 4);
        assert_eq!(position_missing(&draws, Position::Ten)[0], 0);
    }

    #[test]
    fn test_due_bonus_monotonic_and_capped() {
        let mut previous = 0.0;
        for m in 0..40 {
            let b = due_bonus(m, 0.2, 2.5);
            assert!(b >= previous);
            assert!(b <= 2.5);
            previous = b;
        }
        assert_eq!(due_bonus(100, 0.2, 2.5), 2.5);
        assert_eq!(due_bonus(0, 0.2, 2.5), 0.0);
    }

    #[test]
    fn test_signal_favors_overdue() {
        let draws: Vec<Draw> = (0..20)
            .map(|i| Draw::new(format!("{:03}", i), (i % 3) as u8, 0, 0).unwrap())
            .collect();
        let config = EngineConfig::default();
        let ctx = SignalContext { draws: &draws, window: 30, config: &config };
        let signal = MissingValueModel::new(1.0).evaluate(&ctx);
        let row = &signal.votes[Position::Hundred.index()];
        assert!(row[9] > row[1]);
        assert_eq!(row[9], 2.5);
    }
}
