pub mod follow;
pub mod markov;
pub mod missing;
pub mod pattern;
pub mod periodic;
pub mod trend;

use tridigit_db::models::{Draw, Position, DIGIT_COUNT};
use crate::config::EngineConfig;

pub type DigitVotes = [f64; DIGIT_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Votes issus d'une correspondance historique, rapportés dans `pattern_matches`.
    Pattern,
    /// Probabilités de transition (chaîne de Markov).
    Transition,
    /// Bonus additif brut (retard, périodicité, tendance, amplitude).
    Bonus,
}

#[derive(Debug, Clone)]
pub struct Signal {
    pub name: String,
    pub kind: SignalKind,
    pub weight: f64,
    pub matched_count: u32,
    /// Indexé par `Position::index()`.
    pub votes: [DigitVotes; 3],
}

impl Signal {
    pub fn empty(name: &str, kind: SignalKind, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            weight,
            matched_count: 0,
            votes: [[0.0; DIGIT_COUNT]; 3],
        }
    }

    /// Mêmes votes pour les trois positions.
    pub fn add_shared(&mut self, digit: u8, amount: f64) {
        for row in &mut self.votes {
            row[digit as usize] += amount;
        }
    }

    pub fn add(&mut self, position: Position, digit: u8, amount: f64) {
        self.votes[position.index()][digit as usize] += amount;
    }

    /// Contribution au score brut d'une position. Les votes et transitions sont
    /// ramenés à une distribution (somme 1) puis pondérés ; les bonus restent bruts.
    pub fn contribution(&self, position: Position, scale: f64) -> DigitVotes {
        let row = &self.votes[position.index()];
        match self.kind {
            SignalKind::Pattern | SignalKind::Transition => {
                let total: f64 = row.iter().sum();
                if total <= 0.0 {
                    return [0.0; DIGIT_COUNT];
                }
                row.map(|v| v / total * self.weight * scale)
            }
            SignalKind::Bonus => row.map(|v| v * self.weight),
        }
    }
}

/// Entrées communes à tous les sous-modèles. draws triés par période croissante.
pub struct SignalContext<'a> {
    pub draws: &'a [Draw],
    pub window: usize,
    pub config: &'a EngineConfig,
}

pub trait SignalModel: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, ctx: &SignalContext) -> Signal;
}

pub fn all_models(config: &EngineConfig) -> Vec<Box<dyn SignalModel>> {
    let w = &config.weights;
    let mut models: Vec<Box<dyn SignalModel>> = pattern::PatternFeature::ALL
        .iter()
        .map(|&feature| {
            Box::new(pattern::PatternMatcher::new(feature, feature.weight(w))) as Box<dyn SignalModel>
        })
        .collect();
    models.push(Box::new(pattern::StreakModel::new(w.streaks)));
    models.push(Box::new(follow::FollowModel::new(w.follow_relations)));
    models.push(Box::new(markov::MarkovModel::new(w.markov_chain)));
    models.push(Box::new(missing::MissingValueModel::new(w.missing_value)));
    models.push(Box::new(periodic::PeriodicModel::new(w.periodic_pattern)));
    models.push(Box::new(trend::TrendModel::new(w.trend)));
    models.push(Box::new(trend::AmplitudeModel::new(w.amplitude)));
    models
}

/// Tirages déterministes pour les tests, périodes `00001`, `00002`, ...
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let digits = [
                ((i * 3 + i / 7) % 10) as u8,
                ((i * i + 1) % 10) as u8,
                ((i * 7 + 3 * (i / 4)) % 10) as u8,
            ];
            let period = format!("{:05}", i + 1);
            Draw {
                id: format!("{}_{}{}{}", period, digits[0], digits[1], digits[2]),
                period,
                digits,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_normalizes_votes() {
        let mut signal = Signal::empty("test", SignalKind::Pattern, 2.0);
        signal.add_shared(3, 1.0);
        signal.add_shared(4, 3.0);
        let c = signal.contribution(Position::Ten, 10.0);
        assert!((c[3] - 5.0).abs() < 1e-9);
        assert!((c[4] - 15.0).abs() < 1e-9);
        assert_eq!(c[0], 0.0);
    }

    #[test]
    fn test_contribution_bonus_is_raw() {
        let mut signal = Signal::empty("bonus", SignalKind::Bonus, 0.5);
        signal.add(Position::One, 7, 4.0);
        assert_eq!(signal.contribution(Position::One, 10.0)[7], 2.0);
        assert_eq!(signal.contribution(Position::Hundred, 10.0)[7], 0.0);
    }

    #[test]
    fn test_contribution_empty_signal() {
        let signal = Signal::empty("vide", SignalKind::Transition, 2.0);
        assert!(signal.contribution(Position::Hundred, 10.0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_all_models_names_unique() {
        let models = all_models(&EngineConfig::default());
        let mut names: Vec<&str> = models.iter().map(|m| m.name()).collect();
        let n = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), n);
    }

    #[test]
    fn test_make_test_draws_sorted_and_valid() {
        let draws = make_test_draws(50);
        assert_eq!(draws.len(), 50);
        assert!(draws.windows(2).all(|w| w[0].period < w[1].period));
        assert!(draws.iter().all(|d| d.digits.iter().all(|&x| x <= 9)));
    }
}
