use chrono::{DateTime, Utc};

use tridigit_db::models::{CombinedPick, DigitScore, Draw, PatternMatch, Position, Prediction, DIGIT_COUNT};

use crate::config::EngineConfig;
use crate::models::{all_models, DigitVotes, Signal, SignalContext, SignalKind, SignalModel};
use crate::period::next_period;

/// Chiffres retenus par position pour former les combinaisons.
const COMBINED_DEPTH: usize = 3;
const CONFIDENCE_FROM_WEIGHT: f64 = 30.0;
const CONFIDENCE_FROM_COVERAGE: f64 = 30.0;

pub struct Predictor {
    config: EngineConfig,
    models: Vec<Box<dyn SignalModel>>,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Predictor {
    pub fn new(config: EngineConfig) -> Self {
        let models = all_models(&config);
        Self { config, models }
    }

    /// draws triés par période croissante. `None` sous `min_draws` tirages.
    pub fn predict(&self, draws: &[Draw], window: usize) -> Option<Prediction> {
        self.predict_at(draws, window, Utc::now())
    }

    /// Même entrée et même horodatage : prédiction identique.
    pub fn predict_at(&self, draws: &[Draw], window: usize, generated_at: DateTime<Utc>) -> Option<Prediction> {
        let last = draws.last()?;
        if draws.len() < self.config.min_draws {
            tracing::warn!(
                draws = draws.len(),
                min = self.config.min_draws,
                "historique insuffisant, pas de prédiction"
            );
            return None;
        }
        let window = window.max(1);

        let ctx = SignalContext { draws, window, config: &self.config };
        let signals: Vec<Signal> = self.models.iter().map(|m| m.evaluate(&ctx)).collect();

        let [hundred, ten, one] = Position::ALL.map(|p| {
            let raw = combine_signals(&signals, p, self.config.signal_scale);
            rank_digits(&raw, self.config.smoothing_base, self.config.smoothing_share)
        });

        let pattern_matches = collect_pattern_matches(&signals);
        let pattern_models = signals.iter().filter(|s| s.kind == SignalKind::Pattern).count();
        let overall_confidence = overall_confidence(&pattern_matches, pattern_models, self.config.max_confidence);
        let combined = combined_picks(&[&hundred, &ten, &one], self.config.combined_count);

        let prediction = Prediction {
            period: next_period(&last.period),
            window_size: window,
            hundred,
            ten,
            one,
            combined,
            overall_confidence,
            pattern_matches,
            generated_at,
        };
        tracing::debug!(
            period = %prediction.period,
            confidence = prediction.overall_confidence,
            matches = prediction.pattern_matches.len(),
            "prédiction générée"
        );
        Some(prediction)
    }
}

/// Prédiction avec la configuration par défaut.
pub fn generate_prediction(draws: &[Draw], window: usize) -> Option<Prediction> {
    Predictor::default().predict(draws, window)
}

pub fn combine_signals(signals: &[Signal], position: Position, scale: f64) -> DigitVotes {
    let mut raw = [0.0; DIGIT_COUNT];
    for signal in signals {
        let c = signal.contribution(position, scale);
        for d in 0..DIGIT_COUNT {
            raw[d] += c[d];
        }
    }
    raw
}

/// Lissage proportionnel puis pourcentages entiers ; tri par score brut décroissant,
/// égalités départagées par le plus petit chiffre.
pub fn rank_digits(raw: &DigitVotes, base: f64, share: f64) -> Vec<DigitScore> {
    let raw_total: f64 = raw.iter().sum();
    let smoothed = raw.map(|r| r + base + share * raw_total);
    let total: f64 = smoothed.iter().sum();

    let mut ranking: Vec<DigitScore> = (0..DIGIT_COUNT)
        .map(|d| {
            let probability = if total > 0.0 {
                (100.0 * smoothed[d] / total).round() as u32
            } else {
                (100 / DIGIT_COUNT) as u32
            };
            DigitScore { digit: d as u8, score: raw[d], probability }
        })
        .collect();
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.digit.cmp(&b.digit)));
    ranking
}

fn collect_pattern_matches(signals: &[Signal]) -> Vec<PatternMatch> {
    signals
        .iter()
        .filter(|s| s.kind == SignalKind::Pattern && s.matched_count > 0)
        .map(|s| PatternMatch {
            feature_name: s.name.clone(),
            matched_count: s.matched_count,
            confidence: s.weight,
        })
        .collect()
}

/// Croît avec le poids moyen des motifs actifs et la part de motifs actifs.
pub fn overall_confidence(matches: &[PatternMatch], pattern_models: usize, cap: u32) -> u32 {
    if matches.is_empty() || pattern_models == 0 {
        return 0;
    }
    let avg = matches.iter().map(|m| m.confidence).sum::<f64>() / matches.len() as f64;
    let coverage = matches.len() as f64 / pattern_models as f64;
    let value = (CONFIDENCE_FROM_WEIGHT * avg + CONFIDENCE_FROM_COVERAGE * coverage).round();
    (value.max(0.0) as u32).min(cap)
}

/// Produit cartésien des meilleurs chiffres de chaque position, classé par
/// moyenne géométrique des probabilités.
pub fn combined_picks(rankings: &[&Vec<DigitScore>; 3], count: usize) -> Vec<CombinedPick> {
    let tops: Vec<&[DigitScore]> = rankings
        .iter()
        .map(|r| &r[..r.len().min(COMBINED_DEPTH)])
        .collect();

    let mut picks = Vec::new();
    for h in tops[0] {
        for t in tops[1] {
            for o in tops[2] {
                let product = h.probability as f64 * t.probability as f64 * o.probability as f64;
                picks.push(CombinedPick {
                    digits: [h.digit, t.digit, o.digit],
                    score: (product.cbrt() * 100.0).round() / 100.0,
                });
            }
        }
    }
    picks.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.digits.cmp(&b.digits)));
    picks.truncate(count);
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_test_draws;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn assert_permutation(ranking: &[DigitScore]) {
        let mut digits: Vec<u8> = ranking.iter().map(|s| s.digit).collect();
        digits.sort();
        assert_eq!(digits, (0..10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_rankings_are_permutations() {
        let draws = make_test_draws(50);
        let prediction = generate_prediction(&draws, 30).unwrap();
        for p in Position::ALL {
            let ranking = prediction.ranking(p);
            assert_eq!(ranking.len(), 10);
            assert_permutation(ranking);
            assert!(ranking.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn test_probabilities_sum_near_100() {
        for n in [5, 12, 50, 120] {
            let draws = make_test_draws(n);
            let prediction = generate_prediction(&draws, 30).unwrap();
            for p in Position::ALL {
                let total: u32 = prediction.ranking(p).iter().map(|s| s.probability).sum();
                assert!((95..=105).contains(&total), "n={} {:?} total={}", n, p, total);
                assert!(prediction.ranking(p).iter().all(|s| s.probability <= 100));
            }
        }
    }

    #[test]
    fn test_prediction_deterministic() {
        let draws = make_test_draws(60);
        let predictor = Predictor::default();
        let a = predictor.predict_at(&draws, 30, fixed_time()).unwrap();
        let b = predictor.predict_at(&draws, 30, fixed_time()).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_too_few_draws() {
        assert!(generate_prediction(&[], 30).is_none());
        assert!(generate_prediction(&make_test_draws(4), 30).is_none());
        assert!(generate_prediction(&make_test_draws(5), 30).is_some());
    }

    #[test]
    fn test_prediction_targets_next_period() {
        let draws = make_test_draws(10);
        let prediction = generate_prediction(&draws, 10).unwrap();
        assert_eq!(prediction.period, "00011");
        assert_eq!(prediction.window_size, 10);
    }

    #[test]
    fn test_confidence_bounded() {
        let draws = make_test_draws(200);
        let prediction = generate_prediction(&draws, 20).unwrap();
        assert!(prediction.overall_confidence <= 95);
        assert!(prediction.pattern_matches.iter().all(|m| m.matched_count > 0));
        assert!(prediction.pattern_matches.iter().all(|m| m.feature_name != "Suiveurs" && m.feature_name != "Markov"));
    }

    #[test]
    fn test_overall_confidence_formula() {
        assert_eq!(overall_confidence(&[], 10, 95), 0);
        let matches = vec![
            PatternMatch { feature_name: "a".into(), matched_count: 3, confidence: 1.0 },
            PatternMatch { feature_name: "b".into(), matched_count: 1, confidence: 1.0 },
        ];
        // 30·1.0 + 30·0.5
        assert_eq!(overall_confidence(&matches, 4, 95), 45);
        assert_eq!(overall_confidence(&matches, 4, 40), 40);
    }

    #[test]
    fn test_rank_digits_ties_smaller_first() {
        let raw = [0.0; 10];
        let ranking = rank_digits(&raw, 1.0, 0.02);
        assert_eq!(ranking.iter().map(|s| s.digit).collect::<Vec<_>>(), (0..10).collect::<Vec<u8>>());
        assert!(ranking.iter().all(|s| s.probability == 10));
    }

    #[test]
    fn test_rank_digits_order_and_floor() {
        let mut raw = [0.0; 10];
        raw[7] = 50.0;
        raw[2] = 20.0;
        let ranking = rank_digits(&raw, 1.0, 0.02);
        assert_eq!(ranking[0].digit, 7);
        assert_eq!(ranking[1].digit, 2);
        assert!(ranking.iter().all(|s| s.probability > 0));
    }

    #[test]
    fn test_combined_picks() {
        let draws = make_test_draws(40);
        let prediction = generate_prediction(&draws, 30).unwrap();
        assert_eq!(prediction.combined.len(), 5);
        let best = (prediction.hundred[0].probability as f64
            * prediction.ten[0].probability as f64
            * prediction.one[0].probability as f64)
            .cbrt();
        assert!((prediction.combined[0].score - best).abs() < 0.01);
        assert!(prediction.combined.windows(2).all(|w| w[0].score >= w[1].score));
        for pick in &prediction.combined {
            assert!(prediction.hundred[..3].iter().any(|s| s.digit == pick.digits[0]));
        }
    }

    #[test]
    fn test_cyclic_hundreds_trend_favors_continuation() {
        let draws: Vec<Draw> = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 0]
            .iter()
            .enumerate()
            .map(|(i, &h)| Draw::new(format!("{}", i + 1), h, (i % 4) as u8, (i % 7) as u8).unwrap())
            .collect();
        let prediction = generate_prediction(&draws, 10);
        assert!(prediction.is_some());
        let trend = crate::models::trend::trend_scores(&draws, Position::Hundred);
        assert!(trend[1] > trend[5]);
    }
}
