use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Poids relatifs des sous-modèles. Les relations de suivi et les transitions
/// de Markov dominent, les correspondances descriptives restent plus faibles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub hot_cold: f64,
    pub sum_value: f64,
    pub span_value: f64,
    pub size_ratio: f64,
    pub odd_even_ratio: f64,
    pub road_ratio: f64,
    pub position_missing: f64,
    pub zone: f64,
    pub missing_layers: f64,
    pub streaks: f64,
    pub follow_relations: f64,
    pub markov_chain: f64,
    pub missing_value: f64,
    pub periodic_pattern: f64,
    pub trend: f64,
    pub amplitude: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            hot_cold: 1.2,
            sum_value: 0.9,
            span_value: 0.9,
            size_ratio: 0.8,
            odd_even_ratio: 0.8,
            road_ratio: 0.7,
            position_missing: 1.0,
            zone: 1.0,
            missing_layers: 0.9,
            streaks: 1.2,
            follow_relations: 2.2,
            markov_chain: 2.0,
            missing_value: 1.0,
            periodic_pattern: 0.6,
            trend: 1.2,
            amplitude: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTolerances {
    pub sum: u8,
    pub span: u8,
    /// Similarité de Jaccard minimale pour les ensembles (chauds, zones, couches).
    pub jaccard: f64,
    /// Écart maximal entre deux retards de position.
    pub missing_gap: usize,
}

impl Default for MatchTolerances {
    fn default() -> Self {
        Self {
            sum: 1,
            span: 1,
            jaccard: 0.5,
            missing_gap: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window_size: usize,
    /// En dessous, aucune prédiction n'est produite.
    pub min_draws: usize,
    pub hit_threshold: u8,
    pub validation_cap: usize,
    /// Historique utilisé pour la matrice de transition.
    pub markov_lookback: usize,
    /// Paires consécutives utilisées pour les relations de suivi.
    pub follow_lookback: usize,
    /// Multiplicateur appliqué aux distributions (motifs, suivi, Markov).
    pub signal_scale: f64,
    pub missing_step: f64,
    pub missing_cap: f64,
    pub smoothing_base: f64,
    pub smoothing_share: f64,
    pub max_confidence: u32,
    pub combined_count: usize,
    pub tolerances: MatchTolerances,
    pub weights: SignalWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            min_draws: 5,
            hit_threshold: 3,
            validation_cap: 200,
            markov_lookback: 60,
            follow_lookback: 80,
            signal_scale: 10.0,
            missing_step: 0.2,
            missing_cap: 2.5,
            smoothing_base: 1.0,
            smoothing_share: 0.02,
            max_confidence: 95,
            combined_count: 5,
            tolerances: MatchTolerances::default(),
            weights: SignalWeights::default(),
        }
    }
}

pub fn save_config(config: &EngineConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let config: EngineConfig = serde_json::from_str(&json)
        .with_context(|| format!("Configuration invalide dans {:?}", path))?;
    Ok(config)
}
