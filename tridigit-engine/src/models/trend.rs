use tridigit_db::models::{Draw, Position, DIGIT_COUNT};
use super::{Signal, SignalContext, SignalKind, SignalModel};

const RUN_BONUS: f64 = 3.0;
const ZIGZAG_BONUS: f64 = 1.5;
const LARGE_AMPLITUDE: u8 = 5;
const LARGE_AMPLITUDE_BONUS: f64 = 2.5;
const SMALL_AMPLITUDE_BONUS: f64 = 2.0;
/// Décalages favorisés après un petit saut.
const TYPICAL_OFFSETS: [u8; 2] = [4, 6];

fn shift(digit: u8, offset: i8) -> u8 {
    (digit as i8 + offset).rem_euclid(DIGIT_COUNT as i8) as u8
}

fn last_values(draws: &[Draw], position: Position, count: usize) -> Option<Vec<u8>> {
    if draws.len() < count {
        return None;
    }
    Some(draws[draws.len() - count..].iter().map(|d| position.digit_of(d)).collect())
}

/// Score de tendance sur les trois dernières valeurs d'une position.
/// Suite +1 ou -1 (modulo 10) : prolongement favorisé. Sinon, un zigzag
/// favorise le retour vers la valeur précédente.
pub fn trend_scores(draws: &[Draw], position: Position) -> [f64; DIGIT_COUNT] {
    let mut scores = [0.0; DIGIT_COUNT];
    let Some(v) = last_values(draws, position, 3) else {
        return scores;
    };
    let (a, b, c) = (v[0], v[1], v[2]);

    if shift(a, 1) == b && shift(b, 1) == c {
        scores[shift(c, 1) as usize] = RUN_BONUS;
    } else if shift(a, -1) == b && shift(b, -1) == c {
        scores[shift(c, -1) as usize] = RUN_BONUS;
    } else if b > a && c < b {
        scores[shift(c, 1) as usize] = ZIGZAG_BONUS;
        scores[shift(c, 2) as usize] = ZIGZAG_BONUS;
    } else if b < a && c > b {
        scores[shift(c, -1) as usize] = ZIGZAG_BONUS;
        scores[shift(c, -2) as usize] = ZIGZAG_BONUS;
    }
    scores
}

/// Après un grand saut (≥5) : la valeur courante et ses voisines.
/// Après un petit saut : valeur courante +4 et +6.
pub fn amplitude_scores(draws: &[Draw], position: Position) -> [f64; DIGIT_COUNT] {
    let mut scores = [0.0; DIGIT_COUNT];
    let Some(v) = last_values(draws, position, 2) else {
        return scores;
    };
    let (prev, cur) = (v[0], v[1]);

    if cur.abs_diff(prev) >= LARGE_AMPLITUDE {
        for offset in [-1, 0, 1] {
            scores[shift(cur, offset) as usize] = LARGE_AMPLITUDE_BONUS;
        }
    } else {
        for offset in TYPICAL_OFFSETS {
            scores[shift(cur, offset as i8) as usize] = SMALL_AMPLITUDE_BONUS;
        }
    }
    scores
}

pub struct TrendModel {
    weight: f64,
}

impl TrendModel {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl SignalModel for TrendModel {
    fn name(&self) -> &str {
        "Tendance"
    }

    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Bonus, self.weight);
        for p in Position::ALL {
            signal.votes[p.index()] = trend_scores(ctx.draws, p);
        }
        signal
    }
}

pub struct AmplitudeModel {
    weight: f64,
}

impl AmplitudeModel {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl SignalModel for AmplitudeModel {
    fn name(&self) -> &str {
        "Amplitude"
    }

    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Bonus, self.weight);
        for p in Position::ALL {
            signal.votes[p.index()] = amplitude_scores(ctx.draws, p);
        }
        signal
    }
}
