use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nombre de chiffres possibles par position (0-9).
pub const DIGIT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub id: String,
    pub period: String,
    /// Centaines, dizaines, unités.
    pub digits: [u8; 3],
}

impl Draw {
    pub fn new(period: impl Into<String>, hundred: u8, ten: u8, one: u8) -> Result<Self> {
        let period = period.into();
        let digits = [hundred, ten, one];
        validate_digits(&digits)?;
        if period.trim().is_empty() {
            bail!("Période vide");
        }
        Ok(Self {
            id: format!("{}_{}{}{}", period, hundred, ten, one),
            period,
            digits,
        })
    }

    pub fn hundred(&self) -> u8 {
        self.digits[0]
    }

    pub fn ten(&self) -> u8 {
        self.digits[1]
    }

    pub fn one(&self) -> u8 {
        self.digits[2]
    }

    pub fn digit(&self, position: Position) -> u8 {
        self.digits[position.index()]
    }

    pub fn contains(&self, digit: u8) -> bool {
        self.digits.contains(&digit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Hundred,
    Ten,
    One,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Hundred, Position::Ten, Position::One];

    pub fn index(&self) -> usize {
        match self {
            Position::Hundred => 0,
            Position::Ten => 1,
            Position::One => 2,
        }
    }

    pub fn digit_of(&self, draw: &Draw) -> u8 {
        draw.digits[self.index()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Hundred => "Centaines",
            Position::Ten => "Dizaines",
            Position::One => "Unités",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub fn validate_digits(digits: &[u8; 3]) -> Result<()> {
    for (position, &d) in Position::ALL.iter().zip(digits.iter()) {
        if d > 9 {
            bail!("{} : chiffre {} hors limites (0-9)", position, d);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitScore {
    pub digit: u8,
    pub score: f64,
    /// Pourcentage entier 0-100.
    pub probability: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub feature_name: String,
    pub matched_count: u32,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPick {
    pub digits: [u8; 3],
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Période visée (celle qui suit le dernier tirage connu).
    pub period: String,
    pub window_size: usize,
    pub hundred: Vec<DigitScore>,
    pub ten: Vec<DigitScore>,
    pub one: Vec<DigitScore>,
    pub combined: Vec<CombinedPick>,
    pub overall_confidence: u32,
    pub pattern_matches: Vec<PatternMatch>,
    pub generated_at: DateTime<Utc>,
}

impl Prediction {
    pub fn ranking(&self, position: Position) -> &[DigitScore] {
        match position {
            Position::Hundred => &self.hundred,
            Position::Ten => &self.ten,
            Position::One => &self.one,
        }
    }

    /// Classement 1-indexé d'un chiffre, ou `len + 1` s'il est absent.
    pub fn rank_of(&self, position: Position, digit: u8) -> u8 {
        let ranking = self.ranking(position);
        ranking
            .iter()
            .position(|s| s.digit == digit)
            .map(|i| i + 1)
            .unwrap_or(ranking.len() + 1) as u8
    }

    pub fn snapshot(&self) -> PredictionRecord {
        PredictionRecord {
            period: self.period.clone(),
            predicted_at: self.generated_at,
            window_size: self.window_size,
            rankings: Position::ALL.map(|p| self.ranking(p).iter().map(|s| s.digit).collect()),
            confidence: self.overall_confidence,
        }
    }
}

/// Copie figée des classements, conservée dans chaque validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub period: String,
    pub predicted_at: DateTime<Utc>,
    pub window_size: usize,
    pub rankings: [Vec<u8>; 3],
    pub confidence: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub period: String,
    pub prediction: PredictionRecord,
    pub actual: [u8; 3],
    pub hits: [bool; 3],
    pub ranks: [u8; 3],
    pub validated_at: DateTime<Utc>,
}

impl ValidationRecord {
    pub fn any_hit(&self) -> bool {
        self.hits.iter().any(|&h| h)
    }

    pub fn hit(&self, position: Position) -> bool {
        self.hits[position.index()]
    }

    pub fn rank(&self, position: Position) -> u8 {
        self.ranks[position.index()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_draws: usize,
    pub total_predictions: usize,
    pub overall_accuracy: u32,
    pub hundred_accuracy: u32,
    pub ten_accuracy: u32,
    pub one_accuracy: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub recent_accuracy: Vec<u32>,
}

impl StatisticsSummary {
    pub fn accuracy(&self, position: Position) -> u32 {
        match position {
            Position::Hundred => self.hundred_accuracy,
            Position::Ten => self.ten_accuracy,
            Position::One => self.one_accuracy,
        }
    }
}
