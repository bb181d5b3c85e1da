pub mod basic;
pub mod composite;
pub mod position;

use serde::{Deserialize, Serialize};

use tridigit_db::models::Draw;

pub use basic::{BasicFeatures, HotColdStat, StreakStat, StreakState, Temperature};
pub use composite::{CompositeFeatures, DigitZones, FollowMap, MissingLayers};
pub use position::{PositionFeatures, PositionStats};

/// Jeu de caractéristiques complet, recalculé à chaque demande.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub basic: BasicFeatures,
    pub position: PositionFeatures,
    pub composite: CompositeFeatures,
}

/// draws triés par période croissante ; `None` si aucun tirage.
pub fn calculate_all_features(draws: &[Draw], window: usize) -> Option<FeatureSet> {
    Some(FeatureSet {
        basic: basic::calculate_basic_features(draws, window)?,
        position: position::calculate_position_features(draws, window)?,
        composite: composite::calculate_composite_features(draws, window)?,
    })
}

/// Similarité de Jaccard ; deux ensembles vides sont identiques.
pub fn jaccard(a: &[u8], b: &[u8]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.iter().filter(|x| b.contains(x)).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
