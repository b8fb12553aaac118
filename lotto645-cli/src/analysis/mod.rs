pub mod recommend;

use anyhow::{Result, bail};

use lotto645_db::error::LottoError;
use lotto645_db::models::{DRAW_SIZE, Draw, FrequencyTable, ThresholdProfile};

/// Fenêtre « tirages récents » de l'analyse de fréquence.
pub const RECENT_WINDOW: usize = 50;

/// Tables de fréquence sur tout l'historique et sur les `window` derniers
/// tirages. Les numéros sont supposés déjà validés ; un historique vide
/// produit deux tables vides.
pub fn compute_frequencies(draws: &[Draw], window: usize) -> (FrequencyTable, FrequencyTable) {
    let full = FrequencyTable::from_numbers(draws.iter().flat_map(|d| d.numbers.iter().copied()));
    let start = draws.len().saturating_sub(window);
    let recent =
        FrequencyTable::from_numbers(draws[start..].iter().flat_map(|d| d.numbers.iter().copied()));
    (full, recent)
}

/// Seuils statistiques de l'historique : ratio d'impairs, distribution des
/// sommes (moyenne, écart type de population, P25/P75) et moyenne des paires
/// consécutives par tirage.
pub fn compute_thresholds(draws: &[Draw]) -> Result<ThresholdProfile> {
    if draws.len() < 2 {
        bail!(LottoError::DataInsufficient(format!(
            "{} tirage(s) en base, au moins 2 requis pour les statistiques",
            draws.len()
        )));
    }

    let total = (draws.len() * DRAW_SIZE) as f64;
    let odds = draws
        .iter()
        .flat_map(|d| d.numbers.iter())
        .filter(|&&n| n % 2 == 1)
        .count();
    let odd_ratio = odds as f64 / total;

    let mut sums: Vec<f64> = draws
        .iter()
        .map(|d| d.numbers.iter().map(|&n| n as f64).sum())
        .collect();
    let sum_mean = sums.iter().sum::<f64>() / sums.len() as f64;
    let variance = sums.iter().map(|s| (s - sum_mean).powi(2)).sum::<f64>() / sums.len() as f64;
    let sum_std_dev = variance.sqrt();

    sums.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let sum_p25 = percentile(&sums, 0.25);
    let sum_p75 = percentile(&sums, 0.75);

    let pair_total: usize = draws
        .iter()
        .map(|d| consecutive_pairs(&d.sorted_numbers()))
        .sum();
    let avg_consecutive_pairs = pair_total as f64 / draws.len() as f64;

    Ok(ThresholdProfile {
        sum_mean,
        sum_std_dev,
        sum_p25,
        sum_p75,
        odd_ratio,
        avg_consecutive_pairs,
    })
}

/// Percentile par interpolation linéaire entre rangs voisins :
/// rang = p * (n - 1), valeur = x[lo] + frac * (x[lo + 1] - x[lo]).
/// `sorted` doit être trié par ordre croissant et non vide.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;
    if lo + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
}

/// Paires adjacentes d'écart exactement 1 dans une grille triée.
pub fn consecutive_pairs(sorted: &[u8; DRAW_SIZE]) -> usize {
    sorted.windows(2).filter(|w| w[1] - w[0] == 1).count()
}

pub fn odd_count(numbers: &[u8]) -> usize {
    numbers.iter().filter(|&&n| n % 2 == 1).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(draw_no: u32, numbers: [u8; 6]) -> Draw {
        Draw {
            draw_no,
            date: "2024-01-06".to_string(),
            numbers,
            bonus: 45,
            winner_count: 0,
        }
    }

    #[test]
    fn test_frequencies_full_and_recent() {
        let draws = vec![
            draw(1, [1, 2, 3, 4, 5, 6]),
            draw(2, [1, 7, 8, 9, 10, 11]),
            draw(3, [1, 2, 12, 13, 14, 15]),
        ];
        let (full, recent) = compute_frequencies(&draws, 2);
        assert_eq!(full.get(1), 3);
        assert_eq!(full.get(2), 2);
        // la fenêtre récente ne couvre que les tirages 2 et 3
        assert_eq!(recent.get(1), 2);
        assert_eq!(recent.get(6), 0);
    }

    #[test]
    fn test_frequencies_window_larger_than_history() {
        let draws = vec![draw(1, [1, 2, 3, 4, 5, 6])];
        let (full, recent) = compute_frequencies(&draws, 50);
        assert_eq!(full.get(1), 1);
        assert_eq!(recent.get(1), 1);
    }

    #[test]
    fn test_frequencies_empty_history() {
        let (full, recent) = compute_frequencies(&[], 50);
        assert_eq!(full.get(7), 0);
        assert_eq!(recent.get(7), 0);
    }

    #[test]
    fn test_thresholds_known_values() {
        let draws = vec![
            draw(1, [1, 2, 3, 4, 5, 6]),
            draw(2, [7, 8, 9, 10, 11, 12]),
            draw(3, [13, 14, 15, 16, 17, 18]),
        ];
        let t = compute_thresholds(&draws).unwrap();
        // sommes 21, 57, 93
        assert!((t.sum_mean - 57.0).abs() < 1e-9);
        assert!((t.sum_std_dev - 864.0f64.sqrt()).abs() < 1e-9);
        assert!((t.sum_p25 - 39.0).abs() < 1e-9);
        assert!((t.sum_p75 - 75.0).abs() < 1e-9);
        assert!((t.odd_ratio - 0.5).abs() < 1e-9);
        assert!((t.avg_consecutive_pairs - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_thresholds_p25_below_p75() {
        let draws = vec![
            draw(1, [2, 9, 16, 23, 30, 44]),
            draw(2, [1, 3, 12, 28, 35, 41]),
            draw(3, [5, 11, 19, 22, 37, 45]),
            draw(4, [4, 8, 15, 27, 33, 40]),
            draw(5, [6, 13, 20, 26, 38, 43]),
        ];
        let t = compute_thresholds(&draws).unwrap();
        assert!(t.sum_p25 <= t.sum_p75);
        assert!(t.sum_std_dev >= 0.0);
    }

    #[test]
    fn test_thresholds_single_row_fails() {
        let draws = vec![draw(1, [1, 2, 3, 4, 5, 6])];
        let err = compute_thresholds(&draws).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LottoError>(),
            Some(LottoError::DataInsufficient(_))
        ));
    }

    #[test]
    fn test_thresholds_empty_history_fails() {
        assert!(compute_thresholds(&[]).is_err());
    }

    #[test]
    fn test_percentile_interpolation() {
        let values = [10.0, 20.0, 30.0, 40.0];
        // rang 0.75 entre 10 et 20
        assert!((percentile(&values, 0.25) - 17.5).abs() < 1e-9);
        assert!((percentile(&values, 0.75) - 32.5).abs() < 1e-9);
        assert!((percentile(&values, 0.0) - 10.0).abs() < 1e-9);
        assert!((percentile(&values, 1.0) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_consecutive_pairs() {
        assert_eq!(consecutive_pairs(&[1, 2, 3, 4, 5, 6]), 5);
        assert_eq!(consecutive_pairs(&[1, 3, 5, 7, 9, 11]), 0);
        assert_eq!(consecutive_pairs(&[1, 2, 10, 11, 20, 30]), 2);
    }

    #[test]
    fn test_odd_count() {
        assert_eq!(odd_count(&[1, 2, 3, 4, 5, 6]), 3);
        assert_eq!(odd_count(&[2, 4, 6, 8, 10, 12]), 0);
    }
}
