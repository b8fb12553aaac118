use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use crate::analysis::recommend::Recommendation;
use crate::import::ImportResult;
use lotto645_db::models::{Draw, FrequencyTable, ThresholdProfile};

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tirage", "Date", "Numéros", "Bonus", "Gagnants R1"]);

    for draw in draws {
        let numbers_str = draw
            .sorted_numbers()
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");

        table.add_row(vec![
            &draw.draw_no.to_string(),
            &draw.date,
            &numbers_str,
            &format!("{:2}", draw.bonus),
            &draw.winner_count.to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
}

pub fn display_report(
    draw_count: usize,
    window: usize,
    thresholds: &ThresholdProfile,
    full: &FrequencyTable,
    recent: &FrequencyTable,
    stale: bool,
) {
    if stale {
        println!("⚠ Base non rafraîchie : données potentiellement obsolètes.");
    }
    println!("\n📊 Analyse sur {} tirages\n", draw_count);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Indicateur", "Valeur"]);

    table.add_row(vec![
        "Somme moyenne".to_string(),
        format!("{:.1}", thresholds.sum_mean),
    ]);
    table.add_row(vec![
        "Écart type des sommes".to_string(),
        format!("{:.1}", thresholds.sum_std_dev),
    ]);
    table.add_row(vec![
        "Somme P25".to_string(),
        format!("{:.1}", thresholds.sum_p25),
    ]);
    table.add_row(vec![
        "Somme P75".to_string(),
        format!("{:.1}", thresholds.sum_p75),
    ]);
    table.add_row(vec![
        "Ratio de numéros impairs".to_string(),
        format!("{:.1} %", thresholds.odd_ratio * 100.0),
    ]);
    table.add_row(vec![
        "Paires consécutives moyennes".to_string(),
        format!("{:.2}", thresholds.avg_consecutive_pairs),
    ]);
    println!("{table}");

    println!("\n── Fréquences, historique complet (top 10) ──");
    display_frequency_table(full);

    println!("\n── Fréquences, {} derniers tirages (top 10) ──", window);
    display_frequency_table(recent);
}

fn display_frequency_table(freq: &FrequencyTable) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Fréquence"]);

    for number in freq.top(10) {
        table.add_row(vec![
            &format!("{:2}", number),
            &freq.get(number).to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_suggestions(result: &Recommendation) {
    println!("\n🎲 Grilles recommandées\n");

    if result.relaxed {
        println!("Filtre strict insuffisant : fenêtre de somme élargie.");
    }
    if result.suggestions.is_empty() {
        println!("Aucune grille ne passe les filtres.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Numéros", "Score"]);

    for (i, suggestion) in result.suggestions.iter().enumerate() {
        let numbers_str = suggestion
            .numbers
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");

        table.add_row(vec![
            &format!("{}", i + 1),
            &numbers_str,
            &format!("{:.1}", suggestion.score),
        ]);
    }
    println!("{table}");
}
