use chrono::{DateTime, Utc};

use tridigit_db::models::{Draw, Position, Prediction, ValidationRecord};
use tridigit_db::store::DrawStore;

pub const DEFAULT_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// 1-indexé, `len + 1` si le chiffre est absent du classement.
    pub ranks: [u8; 3],
    pub hits: [bool; 3],
}

pub fn validate_prediction(prediction: &Prediction, actual: &Draw, hit_threshold: u8) -> ValidationOutcome {
    let ranks = Position::ALL.map(|p| prediction.rank_of(p, p.digit_of(actual)));
    ValidationOutcome {
        ranks,
        hits: ranks.map(|r| r <= hit_threshold),
    }
}

pub fn build_record(
    prediction: &Prediction,
    actual: &Draw,
    hit_threshold: u8,
    validated_at: DateTime<Utc>,
) -> ValidationRecord {
    let outcome = validate_prediction(prediction, actual, hit_threshold);
    ValidationRecord {
        period: actual.period.clone(),
        prediction: prediction.snapshot(),
        actual: actual.digits,
        hits: outcome.hits,
        ranks: outcome.ranks,
        validated_at,
    }
}

/// Historique borné, trié par période ; les plus anciennes sont évincées.
#[derive(Debug, Clone)]
pub struct ValidationHistory {
    records: Vec<ValidationRecord>,
    cap: usize,
}

impl Default for ValidationHistory {
    fn default() -> Self {
        Self::with_cap(DEFAULT_CAP)
    }
}

impl ValidationHistory {
    pub fn with_cap(cap: usize) -> Self {
        Self { records: Vec::new(), cap }
    }

    pub fn from_records(records: impl IntoIterator<Item = ValidationRecord>, cap: usize) -> Self {
        let mut history = Self::with_cap(cap);
        for record in records {
            history.push(record);
        }
        history
    }

    /// Remplace un enregistrement de même période.
    pub fn push(&mut self, record: ValidationRecord) {
        match self.records.binary_search_by(|r| r.period.as_str().cmp(record.period.as_str())) {
            Ok(idx) => self.records[idx] = record,
            Err(idx) => self.records.insert(idx, record),
        }
        if self.records.len() > self.cap {
            let excess = self.records.len() - self.cap;
            self.records.drain(..excess);
        }
    }

    pub fn records(&self) -> &[ValidationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

/// Valide chaque prédiction dont le tirage cible est arrivé.
pub fn resolve_pending(
    pending: &[Prediction],
    store: &DrawStore,
    hit_threshold: u8,
    validated_at: DateTime<Utc>,
) -> Vec<ValidationRecord> {
    pending
        .iter()
        .filter_map(|prediction| {
            let actual = store.get(&prediction.period)?;
            let record = build_record(prediction, actual, hit_threshold, validated_at);
            tracing::debug!(
                period = %record.period,
                hits = ?record.hits,
                ranks = ?record.ranks,
                "prédiction validée"
            );
            Some(record)
        })
        .collect()
}
