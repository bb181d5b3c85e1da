use crate::models::Draw;

/// Résultat d'une insertion dans le store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub replaced: usize,
}

/// Tirages triés par période croissante (comparaison lexicographique),
/// une seule entrée par période.
#[derive(Debug, Clone, Default)]
pub struct DrawStore {
    draws: Vec<Draw>,
}

impl DrawStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// En cas de doublon, la dernière occurrence l'emporte.
    pub fn from_draws(draws: impl IntoIterator<Item = Draw>) -> Self {
        let mut store = Self::new();
        store.merge(draws);
        store
    }

    pub fn upsert(&mut self, draw: Draw) -> Upsert {
        match self.draws.binary_search_by(|d| d.period.as_str().cmp(draw.period.as_str())) {
            Ok(idx) => {
                self.draws[idx] = draw;
                Upsert::Replaced
            }
            Err(idx) => {
                self.draws.insert(idx, draw);
                Upsert::Inserted
            }
        }
    }

    pub fn merge(&mut self, draws: impl IntoIterator<Item = Draw>) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for draw in draws {
            match self.upsert(draw) {
                Upsert::Inserted => summary.inserted += 1,
                Upsert::Replaced => summary.replaced += 1,
            }
        }
        summary
    }

    pub fn remove_period(&mut self, period: &str) -> Option<Draw> {
        let idx = self.index_of(period)?;
        Some(self.draws.remove(idx))
    }

    pub fn remove_id(&mut self, id: &str) -> Option<Draw> {
        let idx = self.draws.iter().position(|d| d.id == id)?;
        Some(self.draws.remove(idx))
    }

    pub fn clear(&mut self) {
        self.draws.clear();
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn latest(&self) -> Option<&Draw> {
        self.draws.last()
    }

    pub fn get(&self, period: &str) -> Option<&Draw> {
        self.index_of(period).map(|idx| &self.draws[idx])
    }

    /// Les `n` tirages les plus récents (moins si l'historique est court).
    pub fn window(&self, n: usize) -> &[Draw] {
        let start = self.draws.len().saturating_sub(n);
        &self.draws[start..]
    }

    fn index_of(&self, period: &str) -> Option<usize> {
        self.draws
            .binary_search_by(|d| d.period.as_str().cmp(period))
            .ok()
    }
}
