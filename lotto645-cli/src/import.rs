use anyhow::{Context, Result};
use lotto645_db::rusqlite::Connection;
use std::path::Path;

use lotto645_db::db::insert_draw;
use lotto645_db::models::{Draw, validate_draw};

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
}

fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let draw_no_str = get(0)?;
    let draw_no = draw_no_str
        .parse::<u32>()
        .with_context(|| format!("Numéro de tirage illisible : '{}'", draw_no_str))?;

    let date = get(1)?;

    let numbers: [u8; 6] = [
        get_u8(2)?,
        get_u8(3)?,
        get_u8(4)?,
        get_u8(5)?,
        get_u8(6)?,
        get_u8(7)?,
    ];
    let bonus = get_u8(8)?;

    let winner_count_str = get(9).unwrap_or_default();
    let winner_count: u32 = if winner_count_str.is_empty() {
        0
    } else {
        winner_count_str.parse().unwrap_or(0)
    };

    Ok(Draw {
        draw_no,
        date,
        numbers,
        bonus,
        winner_count,
    })
}

/// Charge un fichier CSV `draw_no,date,n1..n6,bonus,winner_count` (une ligne
/// d'en-tête, tirages par numéro croissant). Une ligne hors domaine arrête
/// l'import et annule la transaction ; les tirages déjà en base sont comptés
/// comme ignorés.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let record = record_result
            .with_context(|| format!("Ligne {} illisible", result.total_records))?;
        let draw =
            parse_record(&record).with_context(|| format!("Ligne {}", result.total_records))?;
        validate_draw(&draw).with_context(|| format!("Ligne {}", result.total_records))?;
        if insert_draw(&tx, &draw)? {
            result.inserted += 1;
        } else {
            result.skipped += 1;
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_parse_record() {
        let rec = record(&["1182", "2025-07-26", "3", "8", "17", "25", "34", "41", "29", "12"]);
        let draw = parse_record(&rec).unwrap();
        assert_eq!(draw.draw_no, 1182);
        assert_eq!(draw.date, "2025-07-26");
        assert_eq!(draw.numbers, [3, 8, 17, 25, 34, 41]);
        assert_eq!(draw.bonus, 29);
        assert_eq!(draw.winner_count, 12);
    }

    #[test]
    fn test_parse_record_trims_fields() {
        let rec = record(&[" 7 ", " 2004-05-01 ", "1", "2", "3", "4", "5", "6", " 7 ", ""]);
        let draw = parse_record(&rec).unwrap();
        assert_eq!(draw.draw_no, 7);
        assert_eq!(draw.winner_count, 0);
    }

    #[test]
    fn test_parse_record_missing_field() {
        let rec = record(&["1182", "2025-07-26", "3", "8", "17"]);
        assert!(parse_record(&rec).is_err());
    }

    #[test]
    fn test_parse_record_bad_number() {
        let rec = record(&["1182", "2025-07-26", "trois", "8", "17", "25", "34", "41", "29", "12"]);
        assert!(parse_record(&rec).is_err());
    }

    #[test]
    fn test_import_rejects_out_of_domain_row() {
        use lotto645_db::db::{count_draws, migrate};

        let dir = std::env::temp_dir().join("lotto645-import-test");
        std::fs::create_dir_all(&dir).unwrap();
        let csv_path = dir.join("invalide.csv");
        std::fs::write(
            &csv_path,
            "draw_no,date,n1,n2,n3,n4,n5,n6,bonus,winner_count\n\
             1,2002-12-07,10,23,29,33,37,40,16,0\n\
             2,2002-12-14,9,13,21,25,32,99,2,1\n",
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert!(import_csv(&conn, &csv_path).is_err());
        // la transaction est annulée, rien n'est conservé
        assert_eq!(count_draws(&conn).unwrap(), 0);

        std::fs::remove_file(&csv_path).ok();
    }

    #[test]
    fn test_import_counts_inserted_and_skipped() {
        use lotto645_db::db::{count_draws, migrate};

        let dir = std::env::temp_dir().join("lotto645-import-test");
        std::fs::create_dir_all(&dir).unwrap();
        let csv_path = dir.join("valide.csv");
        std::fs::write(
            &csv_path,
            "draw_no,date,n1,n2,n3,n4,n5,n6,bonus,winner_count\n\
             1,2002-12-07,10,23,29,33,37,40,16,0\n\
             2,2002-12-14,9,13,21,25,32,42,2,1\n",
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let first = import_csv(&conn, &csv_path).unwrap();
        assert_eq!(first.total_records, 2);
        assert_eq!(first.inserted, 2);
        assert_eq!(first.skipped, 0);

        // rejouer le même fichier est sans effet
        let second = import_csv(&conn, &csv_path).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(count_draws(&conn).unwrap(), 2);

        std::fs::remove_file(&csv_path).ok();
    }
}
