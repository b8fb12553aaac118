use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::error::LottoError;
use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    draw_no       INTEGER PRIMARY KEY,
    date          TEXT NOT NULL,
    num_1         INTEGER NOT NULL,
    num_2         INTEGER NOT NULL,
    num_3         INTEGER NOT NULL,
    num_4         INTEGER NOT NULL,
    num_5         INTEGER NOT NULL,
    num_6         INTEGER NOT NULL,
    bonus         INTEGER NOT NULL,
    winner_count  INTEGER NOT NULL DEFAULT 0
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotto645.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            LottoError::StorageUnavailable(format!(
                "impossible de créer le répertoire {:?} : {}",
                parent, e
            ))
        })?;
    }
    let conn = Connection::open(path).map_err(|e| {
        LottoError::StorageUnavailable(format!("impossible d'ouvrir la base {:?} : {}", path, e))
    })?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Insère un tirage si son numéro dépasse strictement le maximum en base.
/// Renvoie `false` (sans erreur) sinon : rejouer la même mise à jour est
/// sans effet.
pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    if let Some(max) = max_draw_no(conn)? {
        if draw.draw_no <= max {
            return Ok(false);
        }
    }
    let numbers = draw.sorted_numbers();
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO draws (draw_no, date, num_1, num_2, num_3, num_4, num_5, num_6, bonus, winner_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                draw.draw_no,
                draw.date,
                numbers[0],
                numbers[1],
                numbers[2],
                numbers[3],
                numbers[4],
                numbers[5],
                draw.bonus,
                draw.winner_count,
            ],
        )
        .context("Échec de l'insertion")?;
    Ok(changed > 0)
}

pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT draw_no, date, num_1, num_2, num_3, num_4, num_5, num_6, bonus, winner_count
         FROM draws ORDER BY draw_no ASC",
    )?;
    let draws = stmt
        .query_map([], map_draw_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT draw_no, date, num_1, num_2, num_3, num_4, num_5, num_6, bonus, winner_count
         FROM draws ORDER BY draw_no DESC LIMIT ?1",
    )?;
    let draws = stmt
        .query_map([limit], map_draw_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

fn map_draw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draw> {
    Ok(Draw {
        draw_no: row.get(0)?,
        date: row.get(1)?,
        numbers: [
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
            row.get::<_, u8>(7)?,
        ],
        bonus: row.get(8)?,
        winner_count: row.get(9)?,
    })
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn max_draw_no(conn: &Connection) -> Result<Option<u32>> {
    let max: Option<u32> = conn.query_row("SELECT MAX(draw_no) FROM draws", [], |row| row.get(0))?;
    Ok(max)
}
