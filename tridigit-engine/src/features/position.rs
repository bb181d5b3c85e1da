use serde::{Deserialize, Serialize};

use tridigit_db::models::{Draw, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionStats {
    pub digit: u8,
    pub frequency: u32,
    pub current_missing: u32,
    pub max_missing: u32,
    pub avg_missing: f64,
    pub amplitude: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDiff {
    pub ht: u8,
    pub to: u8,
    pub ho: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagonalPattern {
    Rising,
    Falling,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymmetryPattern {
    HundredOne,
    HundredTen,
    TenOne,
    None,
}

impl std::fmt::Display for DiagonalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagonalPattern::Rising => write!(f, "diagonale montante"),
            DiagonalPattern::Falling => write!(f, "diagonale descendante"),
            DiagonalPattern::None => write!(f, "—"),
        }
    }
}

impl std::fmt::Display for SymmetryPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymmetryPattern::HundredOne => write!(f, "centaines = unités"),
            SymmetryPattern::HundredTen => write!(f, "centaines = dizaines"),
            SymmetryPattern::TenOne => write!(f, "dizaines = unités"),
            SymmetryPattern::None => write!(f, "—"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFeatures {
    /// Indexé par `Position::index()`.
    pub stats: [PositionStats; 3],
    pub position_sum: u8,
    pub position_diff: PositionDiff,
    pub repeat_positions: [bool; 3],
    pub neighbor_positions: [bool; 3],
    pub diagonal: DiagonalPattern,
    pub symmetry: SymmetryPattern,
}

impl PositionFeatures {
    pub fn get(&self, position: Position) -> &PositionStats {
        &self.stats[position.index()]
    }
}

pub fn calculate_position_features(draws: &[Draw], window: usize) -> Option<PositionFeatures> {
    let current = draws.last()?;
    let previous = if draws.len() > 1 { &draws[draws.len() - 2] } else { current };
    Some(PositionFeatures {
        stats: Position::ALL.map(|p| calculate_position_stats(draws, p, window)),
        position_sum: current.digits.iter().sum(),
        position_diff: position_diff(current),
        repeat_positions: repeat_positions(current, previous),
        neighbor_positions: neighbor_positions(current, previous),
        diagonal: diagonal_pattern(draws),
        symmetry: symmetry_pattern(current),
    })
}

/// Statistiques d'une position sur les `window` derniers tirages.
/// Le retard courant exclut le tirage courant : c'est l'écart depuis la
/// précédente apparition du même chiffre à cette position.
pub fn calculate_position_stats(draws: &[Draw], position: Position, window: usize) -> PositionStats {
    let start = draws.len().saturating_sub(window);
    let recent = &draws[start..];
    let Some(current) = recent.last() else {
        return PositionStats {
            digit: 0,
            frequency: 0,
            current_missing: 0,
            max_missing: 0,
            avg_missing: 0.0,
            amplitude: 0,
        };
    };
    let digit = position.digit_of(current);

    let frequency = recent.iter().filter(|d| position.digit_of(d) == digit).count() as u32;

    let before = &recent[..recent.len() - 1];
    let current_missing = before
        .iter()
        .rev()
        .position(|d| position.digit_of(d) == digit)
        .unwrap_or(before.len()) as u32;

    let gaps = closed_gaps(recent, position, digit);
    let max_missing = gaps.iter().copied().max().unwrap_or(0);
    let avg_missing = if gaps.is_empty() {
        0.0
    } else {
        let mean = gaps.iter().sum::<u32>() as f64 / gaps.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    let amplitude = if recent.len() > 1 {
        digit.abs_diff(position.digit_of(&recent[recent.len() - 2]))
    } else {
        0
    };

    PositionStats {
        digit,
        frequency,
        current_missing,
        max_missing,
        avg_missing,
        amplitude,
    }
}

/// Écarts (en tirages) entre deux apparitions consécutives du chiffre.
fn closed_gaps(draws: &[Draw], position: Position, digit: u8) -> Vec<u32> {
    let mut gaps = Vec::new();
    let mut last_seen: Option<usize> = None;
    for (i, draw) in draws.iter().enumerate() {
        if position.digit_of(draw) == digit {
            if let Some(prev) = last_seen {
                gaps.push((i - prev - 1) as u32);
            }
            last_seen = Some(i);
        }
    }
    gaps
}

pub fn position_diff(draw: &Draw) -> PositionDiff {
    let [h, t, o] = draw.digits;
    PositionDiff {
        ht: h.abs_diff(t),
        to: t.abs_diff(o),
        ho: h.abs_diff(o),
    }
}

pub fn repeat_positions(current: &Draw, previous: &Draw) -> [bool; 3] {
    Position::ALL.map(|p| p.digit_of(current) == p.digit_of(previous))
}

pub fn neighbor_positions(current: &Draw, previous: &Draw) -> [bool; 3] {
    Position::ALL.map(|p| p.digit_of(current).abs_diff(p.digit_of(previous)) == 1)
}

/// Centaines de t-2, dizaines de t-1 et unités de t en progression arithmétique non nulle.
pub fn diagonal_pattern(draws: &[Draw]) -> DiagonalPattern {
    if draws.len() < 3 {
        return DiagonalPattern::None;
    }
    let n = draws.len();
    let a = draws[n - 3].hundred() as i8;
    let b = draws[n - 2].ten() as i8;
    let c = draws[n - 1].one() as i8;
    let step = b - a;
    if step != 0 && c - b == step {
        if step > 0 {
            DiagonalPattern::Rising
        } else {
            DiagonalPattern::Falling
        }
    } else {
        DiagonalPattern::None
    }
}

pub fn symmetry_pattern(draw: &Draw) -> SymmetryPattern {
    let [h, t, o] = draw.digits;
    if h == o {
        SymmetryPattern::HundredOne
    } else if h == t {
        SymmetryPattern::HundredTen
    } else if t == o {
        SymmetryPattern::TenOne
    } else {
        SymmetryPattern::None
    }
}
