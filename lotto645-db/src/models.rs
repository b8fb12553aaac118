use anyhow::{Result, bail};

use crate::error::LottoError;

pub const NUMBER_MAX: u8 = 45;
pub const DRAW_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub draw_no: u32,
    pub date: String,
    pub numbers: [u8; DRAW_SIZE],
    pub bonus: u8,
    pub winner_count: u32,
}

impl Draw {
    /// Numéros triés par ordre croissant, clé canonique pour la comparaison
    /// ensembliste des grilles (le bonus n'en fait pas partie).
    pub fn sorted_numbers(&self) -> [u8; DRAW_SIZE] {
        let mut sorted = self.numbers;
        sorted.sort();
        sorted
    }
}

pub fn validate_draw(draw: &Draw) -> Result<()> {
    if draw.draw_no == 0 {
        bail!(LottoError::Validation("numéro de tirage nul".to_string()));
    }
    for &n in &draw.numbers {
        if n < 1 || n > NUMBER_MAX {
            bail!(LottoError::Validation(format!(
                "numéro {} hors limites (1-{})",
                n, NUMBER_MAX
            )));
        }
    }
    if draw.bonus < 1 || draw.bonus > NUMBER_MAX {
        bail!(LottoError::Validation(format!(
            "bonus {} hors limites (1-{})",
            draw.bonus, NUMBER_MAX
        )));
    }
    for i in 0..draw.numbers.len() {
        for j in (i + 1)..draw.numbers.len() {
            if draw.numbers[i] == draw.numbers[j] {
                bail!(LottoError::Validation(format!(
                    "numéro en double : {}",
                    draw.numbers[i]
                )));
            }
        }
    }
    if draw.numbers.contains(&draw.bonus) {
        bail!(LottoError::Validation(format!(
            "bonus {} déjà parmi les numéros principaux",
            draw.bonus
        )));
    }
    Ok(())
}

/// Occurrences de chaque numéro 1-45 ; un numéro jamais vu lit 0.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: [u32; NUMBER_MAX as usize],
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable {
            counts: [0; NUMBER_MAX as usize],
        }
    }

    pub fn from_numbers<I: IntoIterator<Item = u8>>(numbers: I) -> Self {
        let mut table = Self::new();
        for n in numbers {
            let idx = (n as usize).wrapping_sub(1);
            if idx < table.counts.len() {
                table.counts[idx] += 1;
            }
        }
        table
    }

    pub fn get(&self, number: u8) -> u32 {
        let idx = (number as usize).wrapping_sub(1);
        self.counts.get(idx).copied().unwrap_or(0)
    }

    /// Les `limit` numéros les plus fréquents, fréquences décroissantes,
    /// ex æquo départagés par numéro croissant. Un numéro jamais sorti
    /// n'est pas classé.
    pub fn top(&self, limit: usize) -> Vec<u8> {
        let mut ranked: Vec<(u8, u32)> = (1..=NUMBER_MAX)
            .map(|n| (n, self.get(n)))
            .filter(|&(_, count)| count > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(limit).map(|(n, _)| n).collect()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Seuils dérivés d'un instantané de l'historique, recalculés en bloc
/// à chaque exécution.
#[derive(Debug, Clone)]
pub struct ThresholdProfile {
    pub sum_mean: f64,
    pub sum_std_dev: f64,
    pub sum_p25: f64,
    pub sum_p75: f64,
    pub odd_ratio: f64,
    pub avg_consecutive_pairs: f64,
}

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub numbers: [u8; DRAW_SIZE],
    pub score: f64,
}
