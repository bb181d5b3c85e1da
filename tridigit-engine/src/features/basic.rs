use serde::{Deserialize, Serialize};

use tridigit_db::models::{Draw, DIGIT_COUNT};

const PRIMES: [u8; 4] = [2, 3, 5, 7];
/// Seuil « chaud » relatif au maximum des fréquences.
const HOT_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temperature::Hot => write!(f, "CHAUD"),
            Temperature::Warm => write!(f, "TIÈDE"),
            Temperature::Cold => write!(f, "FROID"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotColdStat {
    pub digit: u8,
    pub frequency: u32,
    pub category: Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakState {
    Hit,
    Miss,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakStat {
    pub digit: u8,
    pub consecutive_hits: u32,
    pub consecutive_misses: u32,
    pub state: StreakState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRatio {
    pub big: u8,
    pub small: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddEvenRatio {
    pub odd: u8,
    pub even: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeCompositeRatio {
    pub prime: u8,
    pub composite: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadRatio {
    pub road0: u8,
    pub road1: u8,
    pub road2: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicFeatures {
    pub hot_cold: Vec<HotColdStat>,
    pub streaks: Vec<StreakStat>,
    pub sum_value: u8,
    pub span_value: u8,
    pub size_ratio: SizeRatio,
    pub odd_even_ratio: OddEvenRatio,
    pub prime_composite_ratio: PrimeCompositeRatio,
    pub road_ratio: RoadRatio,
    pub ac_value: u8,
    pub odd_even_pattern: String,
}

pub fn calculate_basic_features(draws: &[Draw], window: usize) -> Option<BasicFeatures> {
    let current = draws.last()?;
    Some(BasicFeatures {
        hot_cold: calculate_hot_cold(draws, window),
        streaks: calculate_streaks(draws),
        sum_value: sum_value(current),
        span_value: span_value(current),
        size_ratio: size_ratio(current),
        odd_even_ratio: odd_even_ratio(current),
        prime_composite_ratio: prime_composite_ratio(current),
        road_ratio: road_ratio(current),
        ac_value: ac_value(current),
        odd_even_pattern: odd_even_pattern(current),
    })
}

/// Occurrences de chaque chiffre (toutes positions) sur les `window` derniers tirages.
pub fn digit_counts(draws: &[Draw], window: usize) -> [u32; DIGIT_COUNT] {
    let start = draws.len().saturating_sub(window);
    let mut counts = [0u32; DIGIT_COUNT];
    for draw in &draws[start..] {
        for &d in &draw.digits {
            counts[d as usize] += 1;
        }
    }
    counts
}

/// Classement chaud/tiède/froid par seuil médian entre min et max :
/// froid sous le milieu, chaud au-dessus de max(0.7·max, milieu).
pub fn calculate_hot_cold(draws: &[Draw], window: usize) -> Vec<HotColdStat> {
    let counts = digit_counts(draws, window);
    let max = counts.iter().copied().max().unwrap_or(0) as f64;
    let min = counts.iter().copied().min().unwrap_or(0) as f64;
    let mid = (max + min) / 2.0;
    let hot_cut = (max * HOT_RATIO).max(mid);

    counts
        .iter()
        .enumerate()
        .map(|(digit, &frequency)| {
            let f = frequency as f64;
            let category = if max == min {
                Temperature::Warm
            } else if f >= hot_cut {
                Temperature::Hot
            } else if f < mid {
                Temperature::Cold
            } else {
                Temperature::Warm
            };
            HotColdStat { digit: digit as u8, frequency, category }
        })
        .collect()
}

pub fn digits_with(stats: &[HotColdStat], category: Temperature) -> Vec<u8> {
    stats
        .iter()
        .filter(|s| s.category == category)
        .map(|s| s.digit)
        .collect()
}

/// Série en cours pour chaque chiffre, du tirage le plus récent vers le passé.
pub fn calculate_streaks(draws: &[Draw]) -> Vec<StreakStat> {
    (0..DIGIT_COUNT as u8)
        .map(|digit| {
            let mut hits = 0u32;
            let mut misses = 0u32;
            let mut state = StreakState::None;

            for draw in draws.iter().rev() {
                let appeared = draw.contains(digit);
                match (state, appeared) {
                    (StreakState::None, true) | (StreakState::Hit, true) => {
                        hits += 1;
                        state = StreakState::Hit;
                    }
                    (StreakState::None, false) | (StreakState::Miss, false) => {
                        misses += 1;
                        state = StreakState::Miss;
                    }
                    _ => break,
                }
            }

            StreakStat {
                digit,
                consecutive_hits: hits,
                consecutive_misses: misses,
                state,
            }
        })
        .collect()
}

pub fn sum_value(draw: &Draw) -> u8 {
    draw.digits.iter().sum()
}

pub fn span_value(draw: &Draw) -> u8 {
    let max = draw.digits.iter().max().copied().unwrap_or(0);
    let min = draw.digits.iter().min().copied().unwrap_or(0);
    max - min
}

pub fn size_ratio(draw: &Draw) -> SizeRatio {
    let big = draw.digits.iter().filter(|&&d| d >= 5).count() as u8;
    SizeRatio { big, small: 3 - big }
}

pub fn odd_even_ratio(draw: &Draw) -> OddEvenRatio {
    let odd = draw.digits.iter().filter(|&&d| d % 2 == 1).count() as u8;
    OddEvenRatio { odd, even: 3 - odd }
}

/// 0 et 1 sont comptés avec les composés : la partition couvre toujours les 3 chiffres.
pub fn prime_composite_ratio(draw: &Draw) -> PrimeCompositeRatio {
    let prime = draw.digits.iter().filter(|d| PRIMES.contains(d)).count() as u8;
    PrimeCompositeRatio { prime, composite: 3 - prime }
}

pub fn road_ratio(draw: &Draw) -> RoadRatio {
    let mut roads = [0u8; 3];
    for &d in &draw.digits {
        roads[(d % 3) as usize] += 1;
    }
    RoadRatio { road0: roads[0], road1: roads[1], road2: roads[2] }
}

/// Nombre d'écarts absolus distincts et non nuls entre les paires de chiffres.
pub fn ac_value(draw: &Draw) -> u8 {
    let [a, b, c] = draw.digits;
    let mut diffs = [a.abs_diff(b), a.abs_diff(c), b.abs_diff(c)];
    diffs.sort_unstable();
    let mut count = 0u8;
    for i in 0..diffs.len() {
        if diffs[i] != 0 && (i == 0 || diffs[i] != diffs[i - 1]) {
            count += 1;
        }
    }
    count
}

pub fn odd_even_pattern(draw: &Draw) -> String {
    draw.digits
        .iter()
        .map(|d| if d % 2 == 1 { '奇' } else { '偶' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_test_draws;

    fn draw(digits: [u8; 3]) -> Draw {
        Draw::new("001", digits[0], digits[1], digits[2]).unwrap()
    }

    #[test]
    fn test_hot_cold_single_digit_window() {
        let draws: Vec<Draw> = (0..20)
            .map(|i| Draw::new(format!("{:03}", i), 5, 5, 5).unwrap())
            .collect();
        let stats = calculate_hot_cold(&draws, 20);
        for s in &stats {
            if s.digit == 5 {
                assert_eq!(s.category, Temperature::Hot);
                assert_eq!(s.frequency, 60);
            } else {
                assert_eq!(s.category, Temperature::Cold, "digit {}", s.digit);
            }
        }
    }

    #[test]
    fn test_hot_cold_extremes() {
        let draws = make_test_draws(40);
        let stats = calculate_hot_cold(&draws, 30);
        assert_eq!(stats.len(), 10);

        let max = stats.iter().map(|s| s.frequency).max().unwrap();
        let min = stats.iter().map(|s| s.frequency).min().unwrap();
        assert!(max > min);
        for s in &stats {
            if s.frequency == max {
                assert_eq!(s.category, Temperature::Hot);
            }
            if s.frequency == min {
                assert_eq!(s.category, Temperature::Cold);
            }
        }
    }

    #[test]
    fn test_hot_cold_empty_is_neutral() {
        let stats = calculate_hot_cold(&[], 30);
        assert_eq!(stats.len(), 10);
        assert!(stats.iter().all(|s| s.category == Temperature::Warm && s.frequency == 0));
    }

    #[test]
    fn test_hot_cold_window_limits_counts() {
        let mut draws: Vec<Draw> = (0..10)
            .map(|i| Draw::new(format!("{:03}", i), 1, 1, 1).unwrap())
            .collect();
        draws.push(Draw::new("010", 2, 3, 4).unwrap());
        let counts = digit_counts(&draws, 1);
        assert_eq!(counts[1], 0);
        assert_eq!(counts[2], 1);
    }

    #[test]
    fn test_streaks() {
        let draws = vec![
            Draw::new("001", 1, 2, 3).unwrap(),
            Draw::new("002", 4, 5, 6).unwrap(),
            Draw::new("003", 1, 7, 8).unwrap(),
            Draw::new("004", 1, 0, 9).unwrap(),
        ];
        let streaks = calculate_streaks(&draws);

        let one = &streaks[1];
        assert_eq!(one.state, StreakState::Hit);
        assert_eq!(one.consecutive_hits, 2);
        assert_eq!(one.consecutive_misses, 0);

        let two = &streaks[2];
        assert_eq!(two.state, StreakState::Miss);
        assert_eq!(two.consecutive_misses, 3);
        assert_eq!(two.consecutive_hits, 0);

        let five = &streaks[5];
        assert_eq!(five.consecutive_misses, 2);
    }

    #[test]
    fn test_streaks_empty() {
        let streaks = calculate_streaks(&[]);
        assert_eq!(streaks.len(), 10);
        assert!(streaks.iter().all(|s| s.state == StreakState::None));
    }

    #[test]
    fn test_sum_and_span_bounds() {
        for h in 0..10u8 {
            for t in 0..10u8 {
                for o in 0..10u8 {
                    let d = draw([h, t, o]);
                    assert!(sum_value(&d) <= 27);
                    assert!(span_value(&d) <= 9);
                    assert!(ac_value(&d) <= 3);
                }
            }
        }
        assert_eq!(sum_value(&draw([9, 9, 9])), 27);
        assert_eq!(span_value(&draw([0, 4, 9])), 9);
    }

    #[test]
    fn test_ratio_partitions_sum_to_three() {
        for h in 0..10u8 {
            for t in 0..10u8 {
                for o in 0..10u8 {
                    let d = draw([h, t, o]);
                    let size = size_ratio(&d);
                    let oe = odd_even_ratio(&d);
                    let pc = prime_composite_ratio(&d);
                    let road = road_ratio(&d);
                    assert_eq!(size.big + size.small, 3);
                    assert_eq!(oe.odd + oe.even, 3);
                    assert_eq!(pc.prime + pc.composite, 3);
                    assert_eq!(road.road0 + road.road1 + road.road2, 3);
                }
            }
        }
    }

    #[test]
    fn test_ratios_values() {
        let d = draw([2, 5, 9]);
        assert_eq!(size_ratio(&d), SizeRatio { big: 2, small: 1 });
        assert_eq!(odd_even_ratio(&d), OddEvenRatio { odd: 2, even: 1 });
        assert_eq!(prime_composite_ratio(&d), PrimeCompositeRatio { prime: 2, composite: 1 });
        assert_eq!(road_ratio(&d), RoadRatio { road0: 1, road1: 0, road2: 2 });
    }

    #[test]
    fn test_ac_value() {
        assert_eq!(ac_value(&draw([3, 3, 3])), 0);
        assert_eq!(ac_value(&draw([1, 1, 4])), 1);
        assert_eq!(ac_value(&draw([1, 2, 3])), 2);
        assert_eq!(ac_value(&draw([0, 1, 5])), 3);
    }

    #[test]
    fn test_odd_even_pattern() {
        assert_eq!(odd_even_pattern(&draw([1, 2, 3])), "奇偶奇");
    }

    #[test]
    fn test_basic_features_empty() {
        assert!(calculate_basic_features(&[], 30).is_none());
    }
}
