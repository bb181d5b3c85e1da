mod display;
mod import;
mod sample;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use tridigit_db::db::{
    clear_all, count_draws, count_predictions, db_path, delete_draw, fetch_all_draws,
    fetch_predictions, fetch_validations, load_store, migrate, open_db, save_prediction,
    save_validation, trim_validations, upsert_draw,
};
use tridigit_db::models::Draw;
use tridigit_db::rusqlite::Connection;
use tridigit_engine::backtest::backtest_with;
use tridigit_engine::config::{load_config, save_config, EngineConfig};
use tridigit_engine::features::calculate_all_features;
use tridigit_engine::predictor::Predictor;
use tridigit_engine::stats::compute_statistics;
use tridigit_engine::validation::resolve_pending;

use crate::display::{
    display_draws, display_features, display_import_summary, display_prediction, display_stats,
    display_validations,
};

#[derive(Parser)]
#[command(name = "tridigit", about = "Analyse heuristique des tirages à trois chiffres")]
struct Cli {
    /// Fichier de configuration JSON du moteur
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Journalisation détaillée sur stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer des tirages depuis un fichier texte (période c d u)
    Import {
        /// Chemin du fichier
        file: PathBuf,
    },

    /// Exporter tous les tirages (période\tc\td\tu)
    Export {
        file: PathBuf,
    },

    /// Ajouter ou remplacer un tirage
    Add {
        period: String,
        hundred: u8,
        ten: u8,
        one: u8,
    },

    /// Supprimer le tirage d'une période
    Delete {
        period: String,
    },

    /// Vider la base (tirages, prédictions, validations)
    Clear {
        /// Ne pas demander de confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Lister les derniers tirages
    List {
        #[arg(short, long, default_value = "20")]
        last: usize,
    },

    /// Générer des tirages aléatoires (une période par minute)
    Sample {
        #[arg(short, long, default_value = "100")]
        count: usize,

        /// Seed pour la reproductibilité (défaut : date du jour)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Afficher les caractéristiques de la fenêtre courante
    Features {
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Prédire le prochain tirage
    Predict {
        #[arg(short, long)]
        window: Option<usize>,

        /// Ne pas enregistrer la prédiction
        #[arg(long)]
        no_save: bool,
    },

    /// Valider les prédictions dont le tirage est arrivé
    Validate {
        /// Nombre de validations affichées
        #[arg(short, long, default_value = "20")]
        last: usize,
    },

    /// Statistiques de réussite
    Stats,

    /// Évaluation walk-forward sur les derniers tirages
    Backtest {
        #[arg(short, long)]
        window: Option<usize>,

        #[arg(short, long, default_value = "50")]
        last: usize,
    },

    /// Écrire la configuration par défaut
    Config {
        #[arg(short, long, default_value = "tridigit.json")]
        output: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(cli.config.as_deref())?;
    let path = db_path();

    let open = || -> Result<Connection> {
        let conn = open_db(&path)?;
        migrate(&conn)?;
        Ok(conn)
    };

    match cli.command {
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Config { output } => {
            save_config(&EngineConfig::default(), &output)?;
            println!("Configuration écrite dans {}", output.display());
            Ok(())
        }
        Command::Import { file } => cmd_import(&open()?, &file, &config),
        Command::Export { file } => cmd_export(&open()?, &file),
        Command::Add { period, hundred, ten, one } => {
            cmd_add(&open()?, period, [hundred, ten, one], &config)
        }
        Command::Delete { period } => cmd_delete(&open()?, &period),
        Command::Clear { yes } => cmd_clear(&open()?, yes),
        Command::List { last } => cmd_list(&open()?, last),
        Command::Sample { count, seed } => cmd_sample(&open()?, count, seed, &config),
        Command::Features { window } => {
            cmd_features(&open()?, window.unwrap_or(config.window_size))
        }
        Command::Predict { window, no_save } => {
            cmd_predict(&open()?, window.unwrap_or(config.window_size), !no_save, &config)
        }
        Command::Validate { last } => cmd_validate(&open()?, last, &config),
        Command::Stats => cmd_stats(&open()?),
        Command::Backtest { window, last } => {
            cmd_backtest(&open()?, window.unwrap_or(config.window_size), last, &config)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) if p.exists() => load_config(p),
        Some(p) => {
            tracing::warn!(path = %p.display(), "configuration introuvable, valeurs par défaut");
            Ok(EngineConfig::default())
        }
        None => Ok(EngineConfig::default()),
    }
}

fn ensure_not_empty(conn: &Connection) -> Result<bool> {
    if count_draws(conn)? == 0 {
        println!("Base vide. Lancez d'abord : tridigit import <fichier> ou tridigit sample");
        return Ok(false);
    }
    Ok(true)
}

fn cmd_import(conn: &Connection, file: &Path, config: &EngineConfig) -> Result<()> {
    let result = import::import_file(conn, file)?;
    display_import_summary(&result);
    if !result.is_success() {
        bail!("Aucun tirage valide dans {:?}", file);
    }
    auto_validate(conn, config)
}

fn cmd_export(conn: &Connection, file: &Path) -> Result<()> {
    let draws = fetch_all_draws(conn)?;
    import::export_file(&draws, file)?;
    println!("{} tirages exportés vers {}", draws.len(), file.display());
    Ok(())
}

fn cmd_add(conn: &Connection, period: String, digits: [u8; 3], config: &EngineConfig) -> Result<()> {
    let draw = Draw::new(period, digits[0], digits[1], digits[2])?;
    if upsert_draw(conn, &draw)? {
        println!("Tirage {} ajouté.", draw.period);
    } else {
        println!("Tirage {} remplacé.", draw.period);
    }
    auto_validate(conn, config)
}

fn cmd_delete(conn: &Connection, period: &str) -> Result<()> {
    if delete_draw(conn, period)? {
        println!("Tirage {} supprimé.", period);
    } else {
        println!("Aucun tirage pour la période {}.", period);
    }
    Ok(())
}

fn cmd_clear(conn: &Connection, yes: bool) -> Result<()> {
    if !yes {
        let confirm = prompt("Supprimer tous les tirages, prédictions et validations ? (o/n) : ")?;
        if confirm.to_lowercase() != "o" {
            println!("Annulé.");
            return Ok(());
        }
    }
    clear_all(conn)?;
    println!("Base vidée.");
    Ok(())
}

fn cmd_list(conn: &Connection, last: usize) -> Result<()> {
    if !ensure_not_empty(conn)? {
        return Ok(());
    }
    let store = load_store(conn)?;
    display_draws(store.window(last));
    Ok(())
}

fn cmd_sample(conn: &Connection, count: usize, seed: Option<u64>, config: &EngineConfig) -> Result<()> {
    let seed = seed.unwrap_or_else(sample::date_seed);
    let draws = sample::generate_sample(count, seed, Local::now().naive_local())?;
    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    for draw in &draws {
        upsert_draw(&tx, draw)?;
    }
    tx.commit().context("Échec du commit")?;
    println!("{} tirages générés (seed {}).", draws.len(), seed);
    auto_validate(conn, config)
}

fn cmd_features(conn: &Connection, window: usize) -> Result<()> {
    if !ensure_not_empty(conn)? {
        return Ok(());
    }
    let store = load_store(conn)?;
    match calculate_all_features(store.draws(), window) {
        Some(features) => display_features(&features, window),
        None => println!("Pas assez de tirages."),
    }
    Ok(())
}

fn cmd_predict(conn: &Connection, window: usize, save: bool, config: &EngineConfig) -> Result<()> {
    if !ensure_not_empty(conn)? {
        return Ok(());
    }
    let store = load_store(conn)?;
    let predictor = Predictor::new(config.clone());
    let Some(prediction) = predictor.predict(store.draws(), window) else {
        println!(
            "Pas assez de tirages : {} disponibles, {} requis.",
            store.len(),
            config.min_draws
        );
        return Ok(());
    };
    display_prediction(&prediction);
    if save {
        save_prediction(conn, &prediction)?;
        println!("\nPrédiction enregistrée ; lancez `tridigit validate` après le tirage {}.", prediction.period);
    }
    Ok(())
}

/// Valide les prédictions en attente ; retourne le nombre de nouvelles validations.
fn resolve_and_save(conn: &Connection, config: &EngineConfig) -> Result<usize> {
    let store = load_store(conn)?;
    let done: Vec<String> = fetch_validations(conn)?.into_iter().map(|v| v.period).collect();
    let pending: Vec<_> = fetch_predictions(conn)?
        .into_iter()
        .filter(|p| !done.contains(&p.period))
        .collect();

    let records = resolve_pending(&pending, &store, config.hit_threshold, Utc::now());
    for record in &records {
        save_validation(conn, record)?;
    }
    trim_validations(conn, config.validation_cap)?;
    Ok(records.len())
}

fn auto_validate(conn: &Connection, config: &EngineConfig) -> Result<()> {
    let n = resolve_and_save(conn, config)?;
    if n > 0 {
        println!("{} prédiction(s) validée(s).", n);
    }
    Ok(())
}

fn cmd_validate(conn: &Connection, last: usize, config: &EngineConfig) -> Result<()> {
    let n = resolve_and_save(conn, config)?;
    println!("{} nouvelle(s) validation(s).", n);
    let validations = fetch_validations(conn)?;
    let start = validations.len().saturating_sub(last);
    display_validations(&validations[start..]);
    Ok(())
}

fn cmd_stats(conn: &Connection) -> Result<()> {
    let validations = fetch_validations(conn)?;
    let stats = compute_statistics(&validations, count_draws(conn)?, count_predictions(conn)?);
    display_stats(&stats);
    Ok(())
}

fn cmd_backtest(conn: &Connection, window: usize, last: usize, config: &EngineConfig) -> Result<()> {
    if !ensure_not_empty(conn)? {
        return Ok(());
    }
    let store = load_store(conn)?;
    let draws = store.draws();
    println!("Backtest sur les {} derniers tirages (fenêtre {})...", last.min(draws.len()), window);

    let pb = ProgressBar::new(last.min(draws.len()) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("Gabarit de progression invalide")?
            .progress_chars("=> "),
    );
    let records = backtest_with(draws, window, last, config, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();

    if records.is_empty() {
        println!("Pas assez de tirages pour un backtest.");
        return Ok(());
    }
    let start = records.len().saturating_sub(20);
    display_validations(&records[start..]);
    display_stats(&compute_statistics(&records, draws.len(), records.len()));
    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}
