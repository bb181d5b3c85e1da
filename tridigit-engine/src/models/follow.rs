use super::{Signal, SignalContext, SignalKind, SignalModel};
use crate::features::composite::calculate_follow_relations;

/// Poids par rang de suiveur (1er, 2e, 3e).
const RANK_WEIGHTS: [f64; 3] = [3.0, 2.0, 1.0];

pub struct FollowModel {
    weight: f64,
}

impl FollowModel {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl SignalModel for FollowModel {
    fn name(&self) -> &str {
        "Suiveurs"
    }

    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Transition, self.weight);
        let Some(last) = ctx.draws.last() else {
            return signal;
        };
        let map = calculate_follow_relations(ctx.draws, ctx.config.follow_lookback);

        // un chiffre sorti deux fois dans le dernier tirage vote deux fois
        for &digit in &last.digits {
            for (rank, &follower) in map.followers(digit).iter().enumerate() {
                signal.add_shared(follower, RANK_WEIGHTS[rank]);
            }
        }
        signal.matched_count = signal.votes[0].iter().filter(|&&v| v > 0.0).count() as u32;
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use tridigit_db::models::Draw;

    fn seq(rows: &[[u8; 3]]) -> Vec<Draw> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| Draw::new(format!("{:03}", i), r[0], r[1], r[2]).unwrap())
            .collect()
    }

    #[test]
    fn test_follow_ranks_weighted() {
        // suiveurs de 1 : 5 (3 fois), 6 (2), 7 (1)
        let draws = seq(&[[1, 0, 0], [5, 5, 6], [1, 9, 9], [5, 6, 7], [1, 2, 2]]);
        let config = EngineConfig::default();
        let ctx = SignalContext { draws: &draws, window: 30, config: &config };
        let signal = FollowModel::new(1.0).evaluate(&ctx);
        let row = &signal.votes[0];
        assert!(row[5] > row[6]);
        assert!(row[6] > row[7] || row[7] == 0.0);
        assert_eq!(signal.votes[0], signal.votes[2]);
        assert_eq!(signal.kind, SignalKind::Transition);
        assert!(signal.matched_count > 0);
    }

    #[test]
    fn test_follow_empty() {
        let config = EngineConfig::default();
        let ctx = SignalContext { draws: &[], window: 30, config: &config };
        let signal = FollowModel::new(1.0).evaluate(&ctx);
        assert_eq!(signal.matched_count, 0);
    }
}
