use tridigit_db::models::{Draw, Position};

use super::{Signal, SignalContext, SignalKind, SignalModel};
use crate::config::{MatchTolerances, SignalWeights};
use crate::features::basic::{
    calculate_hot_cold, calculate_streaks, digits_with, odd_even_ratio, road_ratio, size_ratio,
    span_value, sum_value, Temperature,
};
use crate::features::composite::{hot_warm_cold_zone, missing_layers};
use crate::features::jaccard;
use crate::features::position::calculate_position_stats;

/// Retard (toutes positions) à partir duquel un chiffre reçoit un vote de série.
const OVERDUE_MISSES: u32 = 5;
const OVERDUE_FACTOR: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFeature {
    HotSet,
    SumValue,
    SpanValue,
    SizeRatio,
    OddEvenRatio,
    RoadRatio,
    PositionMissing,
    Zone,
    MissingLayers,
}

impl PatternFeature {
    pub const ALL: [PatternFeature; 9] = [
        PatternFeature::HotSet,
        PatternFeature::SumValue,
        PatternFeature::SpanValue,
        PatternFeature::SizeRatio,
        PatternFeature::OddEvenRatio,
        PatternFeature::RoadRatio,
        PatternFeature::PositionMissing,
        PatternFeature::Zone,
        PatternFeature::MissingLayers,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PatternFeature::HotSet => "Chauds/froids",
            PatternFeature::SumValue => "Somme",
            PatternFeature::SpanValue => "Écart",
            PatternFeature::SizeRatio => "Grands/petits",
            PatternFeature::OddEvenRatio => "Impairs/pairs",
            PatternFeature::RoadRatio => "Routes 0/1/2",
            PatternFeature::PositionMissing => "Retard par position",
            PatternFeature::Zone => "Zones",
            PatternFeature::MissingLayers => "Couches de retard",
        }
    }

    pub fn weight(&self, weights: &SignalWeights) -> f64 {
        match self {
            PatternFeature::HotSet => weights.hot_cold,
            PatternFeature::SumValue => weights.sum_value,
            PatternFeature::SpanValue => weights.span_value,
            PatternFeature::SizeRatio => weights.size_ratio,
            PatternFeature::OddEvenRatio => weights.odd_even_ratio,
            PatternFeature::RoadRatio => weights.road_ratio,
            PatternFeature::PositionMissing => weights.position_missing,
            PatternFeature::Zone => weights.zone,
            PatternFeature::MissingLayers => weights.missing_layers,
        }
    }
}

/// Résultat de la comparaison entre une fenêtre historique et la fenêtre courante.
enum Similarity {
    /// Les trois chiffres du tirage suivant votent pour toutes les positions.
    Shared(f64),
    PerPosition([Option<f64>; 3]),
}

pub struct PatternMatcher {
    feature: PatternFeature,
    weight: f64,
}

impl PatternMatcher {
    pub fn new(feature: PatternFeature, weight: f64) -> Self {
        Self { feature, weight }
    }

    /// `None` quand les deux fenêtres ne se ressemblent pas pour cette caractéristique.
    fn compare(&self, past: &[Draw], current: &[Draw], tol: &MatchTolerances) -> Option<Similarity> {
        let (a, b) = (past.last()?, current.last()?);
        let exact = |equal: bool| equal.then_some(Similarity::Shared(1.0));
        match self.feature {
            PatternFeature::HotSet => {
                let hot_a = digits_with(&calculate_hot_cold(past, past.len()), Temperature::Hot);
                let hot_b = digits_with(&calculate_hot_cold(current, current.len()), Temperature::Hot);
                let sim = jaccard(&hot_a, &hot_b);
                (sim >= tol.jaccard).then_some(Similarity::Shared(sim))
            }
            PatternFeature::SumValue => exact(sum_value(a).abs_diff(sum_value(b)) <= tol.sum),
            PatternFeature::SpanValue => exact(span_value(a).abs_diff(span_value(b)) <= tol.span),
            PatternFeature::SizeRatio => exact(size_ratio(a) == size_ratio(b)),
            PatternFeature::OddEvenRatio => exact(odd_even_ratio(a) == odd_even_ratio(b)),
            PatternFeature::RoadRatio => exact(road_ratio(a) == road_ratio(b)),
            PatternFeature::PositionMissing => {
                let per_position = Position::ALL.map(|p| {
                    let m_a = calculate_position_stats(past, p, past.len()).current_missing;
                    let m_b = calculate_position_stats(current, p, current.len()).current_missing;
                    ((m_a.abs_diff(m_b) as usize) <= tol.missing_gap).then_some(1.0)
                });
                per_position
                    .iter()
                    .any(Option::is_some)
                    .then_some(Similarity::PerPosition(per_position))
            }
            PatternFeature::Zone => {
                let za = hot_warm_cold_zone(past, past.len());
                let zb = hot_warm_cold_zone(current, current.len());
                let sim = (jaccard(&za.hot, &zb.hot) + jaccard(&za.cold, &zb.cold)) / 2.0;
                (sim >= tol.jaccard).then_some(Similarity::Shared(sim))
            }
            PatternFeature::MissingLayers => {
                let la = missing_layers(past);
                let lb = missing_layers(current);
                let sim = (jaccard(&la.short, &lb.short)
                    + jaccard(&la.medium, &lb.medium)
                    + jaccard(&la.long, &lb.long))
                    / 3.0;
                (sim >= tol.jaccard).then_some(Similarity::Shared(sim))
            }
        }
    }
}

impl SignalModel for PatternMatcher {
    fn name(&self) -> &str {
        self.feature.label()
    }

    /// Fait glisser une fenêtre de même taille sur l'historique ; chaque fenêtre
    /// semblable à la fenêtre courante fait voter le tirage qui la suit.
    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Pattern, self.weight);
        let draws = ctx.draws;
        let n = draws.len();
        if n < 2 {
            return signal;
        }
        let w = ctx.window.clamp(1, n - 1);
        let current = &draws[n - w..];
        let tol = &ctx.config.tolerances;

        for end in w..n {
            let past = &draws[end - w..end];
            let next = &draws[end];
            match self.compare(past, current, tol) {
                Some(Similarity::Shared(sim)) => {
                    for &d in &next.digits {
                        signal.add_shared(d, sim);
                    }
                    signal.matched_count += 1;
                }
                Some(Similarity::PerPosition(sims)) => {
                    for p in Position::ALL {
                        if let Some(sim) = sims[p.index()] {
                            signal.add(p, p.digit_of(next), sim);
                        }
                    }
                    signal.matched_count += 1;
                }
                None => {}
            }
        }
        signal
    }
}

/// Chiffres longtemps absents des trois positions : vote proportionnel au retard.
pub struct StreakModel {
    weight: f64,
}

impl StreakModel {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl SignalModel for StreakModel {
    fn name(&self) -> &str {
        "Séries"
    }

    fn evaluate(&self, ctx: &SignalContext) -> Signal {
        let mut signal = Signal::empty(self.name(), SignalKind::Pattern, self.weight);
        for s in calculate_streaks(ctx.draws) {
            if s.consecutive_misses >= OVERDUE_MISSES {
                signal.add_shared(s.digit, s.consecutive_misses as f64 * OVERDUE_FACTOR);
                signal.matched_count += 1;
            }
        }
        signal
    }
}
