use serde::{Deserialize, Serialize};

use tridigit_db::models::{Draw, DIGIT_COUNT};
use super::basic::{
    calculate_hot_cold, calculate_streaks, digits_with, odd_even_ratio, prime_composite_ratio,
    road_ratio, size_ratio, span_value, sum_value, Temperature,
};

/// Nombre de suiveurs retenus par chiffre.
const FOLLOWERS_KEPT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigitZones {
    pub hot: Vec<u8>,
    pub warm: Vec<u8>,
    pub cold: Vec<u8>,
}

/// Chiffres regroupés par longueur de leur série d'absences en cours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingLayers {
    /// 1 à 3 tirages d'absence.
    pub short: Vec<u8>,
    /// 4 à 7.
    pub medium: Vec<u8>,
    /// 8 et plus.
    pub long: Vec<u8>,
}

/// Pour chaque chiffre 0-9, ses suiveurs les plus fréquents (décroissant).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowMap(pub [Vec<u8>; DIGIT_COUNT]);

impl FollowMap {
    pub fn followers(&self, digit: u8) -> &[u8] {
        &self.0[digit as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFeatures {
    pub sum_tail: u8,
    pub span_tail: u8,
    pub sum_span_combo: String,
    pub size_odd_even_combo: String,
    pub prime_road_combo: String,
    pub zones: DigitZones,
    pub missing_layers: MissingLayers,
    pub follow_relations: FollowMap,
    pub digit_sum: u8,
    pub product_tail: u8,
}

pub fn calculate_composite_features(draws: &[Draw], window: usize) -> Option<CompositeFeatures> {
    let current = draws.last()?;
    Some(CompositeFeatures {
        sum_tail: sum_value(current) % 10,
        span_tail: span_value(current) % 10,
        sum_span_combo: sum_span_combo(current),
        size_odd_even_combo: size_odd_even_combo(current),
        prime_road_combo: prime_road_combo(current),
        zones: hot_warm_cold_zone(draws, window),
        missing_layers: missing_layers(draws),
        follow_relations: calculate_follow_relations(draws, window),
        digit_sum: sum_value(current),
        product_tail: product_tail(current),
    })
}

pub fn sum_span_combo(draw: &Draw) -> String {
    format!("{}-{}", sum_value(draw), span_value(draw))
}

pub fn size_odd_even_combo(draw: &Draw) -> String {
    let size = size_ratio(draw);
    let oe = odd_even_ratio(draw);
    format!("大{}小{}奇{}偶{}", size.big, size.small, oe.odd, oe.even)
}

pub fn prime_road_combo(draw: &Draw) -> String {
    let pc = prime_composite_ratio(draw);
    let road = road_ratio(draw);
    format!(
        "质{}合{}_0{}1{}2{}",
        pc.prime, pc.composite, road.road0, road.road1, road.road2
    )
}

pub fn product_tail(draw: &Draw) -> u8 {
    let product: u32 = draw.digits.iter().map(|&d| d as u32).product();
    (product % 10) as u8
}

pub fn hot_warm_cold_zone(draws: &[Draw], window: usize) -> DigitZones {
    let stats = calculate_hot_cold(draws, window);
    DigitZones {
        hot: digits_with(&stats, Temperature::Hot),
        warm: digits_with(&stats, Temperature::Warm),
        cold: digits_with(&stats, Temperature::Cold),
    }
}

pub fn missing_layers(draws: &[Draw]) -> MissingLayers {
    let mut layers = MissingLayers::default();
    for s in calculate_streaks(draws) {
        match s.consecutive_misses {
            0 => {}
            1..=3 => layers.short.push(s.digit),
            4..=7 => layers.medium.push(s.digit),
            _ => layers.long.push(s.digit),
        }
    }
    layers
}

/// Sur les `window` dernières paires consécutives : quand `a` sort à une position
/// quelconque, les trois chiffres du tirage suivant sont comptés comme suiveurs.
/// Égalités départagées par le plus petit chiffre.
pub fn calculate_follow_relations(draws: &[Draw], window: usize) -> FollowMap {
    let mut tallies = [[0u32; DIGIT_COUNT]; DIGIT_COUNT];
    let start = draws.len().saturating_sub(window + 1);
    for pair in draws[start..].windows(2) {
        let (draw, next) = (&pair[0], &pair[1]);
        for a in 0..DIGIT_COUNT as u8 {
            if draw.contains(a) {
                for &f in &next.digits {
                    tallies[a as usize][f as usize] += 1;
                }
            }
        }
    }

    let mut map = FollowMap::default();
    for (a, tally) in tallies.iter().enumerate() {
        let mut followers: Vec<u8> = (0..DIGIT_COUNT as u8)
            .filter(|&f| tally[f as usize] > 0)
            .collect();
        followers.sort_by(|&x, &y| tally[y as usize].cmp(&tally[x as usize]).then(x.cmp(&y)));
        followers.truncate(FOLLOWERS_KEPT);
        map.0[a] = followers;
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(rows: &[[u8; 3]]) -> Vec<Draw> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| Draw::new(format!("{:03}", i), r[0], r[1], r[2]).unwrap())
            .collect()
    }

    #[test]
    fn test_tails_and_combos() {
        let draw = Draw::new("001", 9, 8, 7).unwrap();
        let features = calculate_composite_features(&[draw.clone()], 30).unwrap();
        assert_eq!(features.sum_tail, 4);
        assert_eq!(features.span_tail, 2);
        assert_eq!(features.sum_span_combo, "24-2");
        assert_eq!(features.digit_sum, 24);
        assert_eq!(features.product_tail, 4);
        assert_eq!(size_odd_even_combo(&draw), "大3小0奇2偶1");
        assert_eq!(prime_road_combo(&draw), "质1合2_011121");
    }

    #[test]
    fn test_zones_partition_all_digits() {
        let draws = seq(&[[1, 1, 2], [1, 3, 4], [1, 5, 6], [7, 8, 9]]);
        let zones = hot_warm_cold_zone(&draws, 30);
        let mut all: Vec<u8> = zones.hot.iter().chain(&zones.warm).chain(&zones.cold).copied().collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<u8>>());
        assert!(zones.hot.contains(&1));
        assert!(zones.cold.contains(&0));
    }

    #[test]
    fn test_missing_layers() {
        let mut rows = vec![[0, 0, 0]];
        rows.extend(std::iter::repeat([1, 2, 3]).take(4));
        rows.extend(std::iter::repeat([4, 5, 6]).take(4));
        let layers = missing_layers(&seq(&rows));
        assert!(layers.short.is_empty());
        assert_eq!(layers.medium, vec![1, 2, 3]);
        assert_eq!(layers.long, vec![0, 7, 8, 9]);
    }

    #[test]
    fn test_follow_relations_top_three() {
        let draws = seq(&[
            [1, 0, 0],
            [5, 5, 6],
            [1, 9, 9],
            [5, 6, 7],
        ]);
        let map = calculate_follow_relations(&draws, 30);
        // suiveurs de 1 : 5,5,6 puis 5,6,7 -> 5:3, 6:2, 7:1
        assert_eq!(map.followers(1), &[5, 6, 7]);
        // suiveurs de 9 : 5,6,7 à égalité -> ordre croissant
        assert_eq!(map.followers(9), &[5, 6, 7]);
        assert!(map.followers(3).is_empty());
    }

    #[test]
    fn test_follow_relations_window() {
        let draws = seq(&[[1, 1, 1], [2, 2, 2], [3, 3, 3], [4, 4, 4]]);
        let map = calculate_follow_relations(&draws, 1);
        assert!(map.followers(1).is_empty());
        assert!(map.followers(2).is_empty());
        assert_eq!(map.followers(3), &[4]);
    }

    #[test]
    fn test_follow_relations_empty() {
        let map = calculate_follow_relations(&[], 30);
        assert!((0..10).all(|d| map.followers(d).is_empty()));
    }
}
