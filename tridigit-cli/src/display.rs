use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::Plot;

use crate::import::ImportResult;
use tridigit_db::models::{Draw, Position, Prediction, StatisticsSummary, ValidationRecord};
use tridigit_engine::features::{FeatureSet, StreakState, Temperature};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn yes_no(hit: bool) -> Cell {
    if hit {
        Cell::new("✓").fg(Color::Green)
    } else {
        Cell::new("✗").fg(Color::Red)
    }
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Période", "Centaines", "Dizaines", "Unités", "Somme"]);
    for draw in draws {
        table.add_row(vec![
            draw.period.clone(),
            draw.hundred().to_string(),
            draw.ten().to_string(),
            draw.one().to_string(),
            draw.digits.iter().sum::<u8>().to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Lignes lues       : {}", result.total_lines);
    println!("  Importés          : {}", result.imported);
    if result.replaced > 0 {
        println!("  dont remplacés    : {}", result.replaced);
    }
    println!("  Ignorés           : {}", result.skipped);
    if result.rejected > 0 {
        println!("  Rejetés (0-9)     : {}", result.rejected);
    }
}

pub fn display_features(features: &FeatureSet, window: usize) {
    let basic = &features.basic;
    println!("\n== Caractéristiques (fenêtre {}) ==\n", window);

    let mut table = new_table(vec!["Chiffre", "Fréquence", "Zone", "Série"]);
    for (hc, streak) in basic.hot_cold.iter().zip(&basic.streaks) {
        let color = match hc.category {
            Temperature::Hot => Color::Red,
            Temperature::Warm => Color::Yellow,
            Temperature::Cold => Color::Blue,
        };
        let series = match streak.state {
            StreakState::Hit => format!("sorti {}x", streak.consecutive_hits),
            StreakState::Miss => format!("absent {}x", streak.consecutive_misses),
            StreakState::None => "—".to_string(),
        };
        table.add_row(vec![
            Cell::new(hc.digit),
            Cell::new(hc.frequency),
            Cell::new(hc.category.to_string()).fg(color),
            Cell::new(series),
        ]);
    }
    println!("{table}");

    println!(
        "Somme {}  Écart {}  AC {}  Motif {}",
        basic.sum_value, basic.span_value, basic.ac_value, basic.odd_even_pattern
    );
    println!(
        "Grands/petits {}:{}  Impairs/pairs {}:{}  Premiers/composés {}:{}  Routes {}:{}:{}",
        basic.size_ratio.big,
        basic.size_ratio.small,
        basic.odd_even_ratio.odd,
        basic.odd_even_ratio.even,
        basic.prime_composite_ratio.prime,
        basic.prime_composite_ratio.composite,
        basic.road_ratio.road0,
        basic.road_ratio.road1,
        basic.road_ratio.road2,
    );

    let position = &features.position;
    let mut table = new_table(vec![
        "Position", "Chiffre", "Fréquence", "Retard", "Retard max", "Retard moyen", "Amplitude",
    ]);
    for p in Position::ALL {
        let s = position.get(p);
        table.add_row(vec![
            p.label().to_string(),
            s.digit.to_string(),
            s.frequency.to_string(),
            s.current_missing.to_string(),
            s.max_missing.to_string(),
            format!("{:.1}", s.avg_missing),
            s.amplitude.to_string(),
        ]);
    }
    println!("\n{table}");
    println!(
        "Diagonale : {}  Symétrie : {}",
        position.diagonal, position.symmetry
    );

    let composite = &features.composite;
    println!(
        "\nQueue somme {}  Queue écart {}  {}  {}  {}",
        composite.sum_tail,
        composite.span_tail,
        composite.sum_span_combo,
        composite.size_odd_even_combo,
        composite.prime_road_combo
    );
    println!(
        "Zones  chauds {:?}  tièdes {:?}  froids {:?}",
        composite.zones.hot, composite.zones.warm, composite.zones.cold
    );
    println!(
        "Retards  courts {:?}  moyens {:?}  longs {:?}",
        composite.missing_layers.short, composite.missing_layers.medium, composite.missing_layers.long
    );

    let mut table = new_table(vec!["Chiffre", "Suiveurs"]);
    for d in 0..10u8 {
        let followers = composite.follow_relations.followers(d);
        let text = if followers.is_empty() {
            "—".to_string()
        } else {
            followers.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(" > ")
        };
        table.add_row(vec![d.to_string(), text]);
    }
    println!("\n{table}");
}

pub fn display_prediction(prediction: &Prediction) {
    println!(
        "\n🎯 Prédiction pour la période {} (fenêtre {}, confiance {}%)\n",
        prediction.period, prediction.window_size, prediction.overall_confidence
    );

    let mut table = new_table(vec!["Rang", "Centaines", "Dizaines", "Unités"]);
    for rank in 0..10 {
        let mut row = vec![Cell::new(rank + 1)];
        for p in Position::ALL {
            let cell = match prediction.ranking(p).get(rank) {
                Some(s) => {
                    let cell = Cell::new(format!("{}  {:>3}%  ({:.2})", s.digit, s.probability, s.score));
                    if rank < 3 { cell.fg(Color::Green) } else { cell }
                }
                None => Cell::new("—"),
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    println!("{table}");

    if !prediction.combined.is_empty() {
        let picks = prediction
            .combined
            .iter()
            .map(|c| format!("{}{}{} ({:.1})", c.digits[0], c.digits[1], c.digits[2], c.score))
            .collect::<Vec<_>>()
            .join("  ");
        println!("Combinaisons : {}", picks);
    }

    if !prediction.pattern_matches.is_empty() {
        let mut table = new_table(vec!["Motif", "Correspondances", "Poids"]);
        for m in &prediction.pattern_matches {
            table.add_row(vec![
                m.feature_name.clone(),
                m.matched_count.to_string(),
                format!("{:.2}", m.confidence),
            ]);
        }
        println!("\n{table}");
    }
}

pub fn display_validations(records: &[ValidationRecord]) {
    if records.is_empty() {
        println!("Aucune validation.");
        return;
    }

    let mut table = new_table(vec!["Période", "Tirage", "Rangs", "C", "D", "U"]);
    for r in records {
        table.add_row(vec![
            Cell::new(&r.period),
            Cell::new(format!("{}{}{}", r.actual[0], r.actual[1], r.actual[2])),
            Cell::new(format!("{} / {} / {}", r.ranks[0], r.ranks[1], r.ranks[2])),
            yes_no(r.hits[0]),
            yes_no(r.hits[1]),
            yes_no(r.hits[2]),
        ]);
    }
    println!("{table}");
}

pub fn display_stats(stats: &StatisticsSummary) {
    println!("\n📊 Statistiques\n");

    let mut table = new_table(vec!["Indicateur", "Valeur"]);
    table.add_row(vec!["Tirages".to_string(), stats.total_draws.to_string()]);
    table.add_row(vec!["Prédictions".to_string(), stats.total_predictions.to_string()]);
    table.add_row(vec!["Précision globale".to_string(), format!("{}%", stats.overall_accuracy)]);
    for p in Position::ALL {
        table.add_row(vec![p.label().to_string(), format!("{}%", stats.accuracy(p))]);
    }
    table.add_row(vec!["Série en cours".to_string(), stats.current_streak.to_string()]);
    table.add_row(vec!["Meilleure série".to_string(), stats.max_streak.to_string()]);
    println!("{table}");

    display_accuracy_chart(&stats.recent_accuracy);
}

pub fn display_accuracy_chart(series: &[u32]) {
    if series.len() < 2 {
        return;
    }
    println!("\n== Précision récente (%) ==\n");
    let points: Vec<(f32, f32)> = series
        .iter()
        .enumerate()
        .map(|(i, &v)| ((i + 1) as f32, v as f32))
        .collect();
    let shape = textplots::Shape::Lines(&points);
    let mut chart = textplots::Chart::new_with_y_range(100, 30, 1.0, series.len() as f32, 0.0, 100.0);
    println!("{}", chart.lineplot(&shape));
}
