use tridigit_db::models::{Draw, Position, DIGIT_COUNT};
use super::{Signal, SignalContext, SignalKind, SignalModel};

/// Lissage de Laplace : dix cases à 0.1 ajoutent exactement 1 au dénominateur.
const EPSILON: f64 = 1.0 / DIGIT_COUNT as f64;

pub type TransitionMatrix = [[f64; DIGIT_COUNT]; DIGIT_COUNT];

pub struct MarkovModel {
    weight: f64,
}

impl MarkovModel {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

/// Matrice de transition lissée d'une position sur les `lookback` derniers tirages.
/// Chaque ligne somme à 1 ; une ligne sans observation est uniforme.
pub fn transition_matrix(draws: &[Draw], position: Position, lookback: usize) -> TransitionMatrix {
    let start = draws.len().saturating_sub(lookback);
    let mut counts = [[0u32; DIGIT_COUNT]; DIGIT_COUNT];
    for pair in draws[start..].windows(2) {
        let from = position.digit_of(&pair[0]) as usize;
        let to = position.digit_of(&pair[1]) as usize;
        counts[from][to] += 1;
    }

    let mut matrix = [[0.0; DIGIT_COUNT]; DIGIT_COUNT];
    for (from, row) in counts.iter().enumerate() {
        let total: u32 = row.iter().sum();
        for (to, &c) in row.iter().enumerate() {
            matrix[from][to] = (c as f64 + EPSILON) / (total as f64 + 1.0);
        }
    }
    matrix
}

impl SignalModel for MarkovModel {
    fn name(&self) -> &str {
        "Markov"
    }

    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Transition, self.weight);
        let Some(last) = ctx.draws.last() else {
            return signal;
        };
        for p in Position::ALL {
            let matrix = transition_matrix(ctx.draws, p, ctx.config.markov_lookback);
            signal.votes[p.index()] = matrix[p.digit_of(last) as usize];
        }
        signal.matched_count = ctx.draws.len().min(ctx.config.markov_lookback).saturating_sub(1) as u32;
        signal
    }
}
