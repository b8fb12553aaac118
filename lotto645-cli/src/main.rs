mod analysis;
mod display;
mod fetch;
mod import;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::analysis::recommend::{build_candidate_pool, recommend};
use crate::analysis::{RECENT_WINDOW, compute_frequencies, compute_thresholds};
use crate::display::{
    display_draws, display_import_summary, display_report, display_suggestions,
};
use lotto645_db::db::{count_draws, db_path, fetch_all_draws, fetch_last_draws, insert_draw, migrate, open_db};
use lotto645_db::models::{Draw, validate_draw};

#[derive(Parser)]
#[command(name = "lotto645", about = "Analyseur statistique du Lotto 6/45")]
struct Cli {
    /// Chemin de la base de tirages
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer l'historique depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher le dernier tirage publié sans l'enregistrer
    Latest,

    /// Récupérer le dernier tirage publié et l'ajouter à la base
    Update,

    /// Afficher le rapport statistique (fréquences et seuils)
    Stats,

    /// Rapport statistique puis grilles recommandées
    Recommend {
        /// Ne pas tenter de rafraîchir la base avant l'analyse
        #[arg(long)]
        no_refresh: bool,
    },

    /// Rejouer les recommandations sur l'historique
    Backtest,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli.db.clone().unwrap_or_else(db_path);
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Latest => cmd_latest(),
        Command::Update => cmd_update(&conn),
        Command::Stats => cmd_stats(&conn),
        Command::Recommend { no_refresh } => cmd_recommend(&conn, no_refresh),
        Command::Backtest => bail!("le mode backtest n'est pas encore implémenté"),
    }
}

fn cmd_import(conn: &lotto645_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &lotto645_db::rusqlite::Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotto645 import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_latest() -> Result<()> {
    let draw = fetch::fetch_latest()
        .with_context(|| format!("Vérifiez manuellement : {}", fetch::RESULT_URL))?;
    display_draws(&[draw]);
    println!("(non enregistré ; utilisez : lotto645 update)");
    Ok(())
}

fn cmd_update(conn: &lotto645_db::rusqlite::Connection) -> Result<()> {
    let draw = fetch::fetch_latest()
        .with_context(|| format!("Vérifiez manuellement : {}", fetch::RESULT_URL))?;
    display_draws(&[draw.clone()]);

    let inserted = insert_draw(conn, &draw)?;
    if inserted {
        println!("Tirage {} ajouté à la base.", draw.draw_no);
    } else {
        println!("Tirage {} déjà présent, ajout ignoré.", draw.draw_no);
    }
    Ok(())
}

fn cmd_stats(conn: &lotto645_db::rusqlite::Connection) -> Result<()> {
    let draws = load_history(conn)?;
    let thresholds = compute_thresholds(&draws)?;
    let (full, recent) = compute_frequencies(&draws, RECENT_WINDOW);

    let window = RECENT_WINDOW.min(draws.len());
    display_report(draws.len(), window, &thresholds, &full, &recent, false);
    Ok(())
}

fn cmd_recommend(conn: &lotto645_db::rusqlite::Connection, no_refresh: bool) -> Result<()> {
    // rafraîchissement au mieux : un collaborateur défaillant n'empêche pas
    // l'analyse de l'historique déjà en base
    let mut stale = false;
    if !no_refresh {
        match fetch::fetch_latest() {
            Ok(draw) => match insert_draw(conn, &draw) {
                Ok(true) => println!("Tirage {} ajouté à la base.", draw.draw_no),
                Ok(false) => println!("Tirage {} déjà présent.", draw.draw_no),
                Err(e) => {
                    eprintln!("Tirage {} non enregistré : {:#}", draw.draw_no, e);
                    stale = true;
                }
            },
            Err(e) => {
                eprintln!("Rafraîchissement impossible : {:#}", e);
                eprintln!("Vérifiez manuellement : {}", fetch::RESULT_URL);
                stale = true;
            }
        }
    }

    let draws = load_history(conn)?;
    let thresholds = compute_thresholds(&draws)?;
    let (full, recent) = compute_frequencies(&draws, RECENT_WINDOW);

    let window = RECENT_WINDOW.min(draws.len());
    display_report(draws.len(), window, &thresholds, &full, &recent, stale);

    let pool = build_candidate_pool(&full, &recent)?;
    let result = recommend(&pool, &thresholds, &draws, &full, &recent)?;
    display_suggestions(&result);
    Ok(())
}

fn load_history(conn: &lotto645_db::rusqlite::Connection) -> Result<Vec<Draw>> {
    let draws = fetch_all_draws(conn)?;
    for draw in &draws {
        validate_draw(draw).with_context(|| format!("Tirage {} invalide en base", draw.draw_no))?;
    }
    Ok(draws)
}
