use std::collections::HashSet;

use anyhow::{Result, bail};
use itertools::Itertools;

use lotto645_db::error::LottoError;
use lotto645_db::models::{DRAW_SIZE, Draw, FrequencyTable, Suggestion, ThresholdProfile};

use super::{consecutive_pairs, odd_count};

/// Pool de candidats : les 20 numéros les plus fréquents sur tout
/// l'historique, plus les 15 plus fréquents sur la fenêtre récente.
const TOP_FULL: usize = 20;
const TOP_RECENT: usize = 15;
/// Borne de sécurité sur la taille du pool avant énumération.
const POOL_LIMIT: usize = 40;
/// Nombre de grilles visé.
const TARGET_COUNT: usize = 5;
/// Multiplicateurs d'écart type de la fenêtre de somme.
const STRICT_WIDTH: f64 = 1.5;
const RELAXED_WIDTH: f64 = 2.0;

#[derive(Debug)]
pub struct Recommendation {
    pub suggestions: Vec<Suggestion>,
    pub relaxed: bool,
}

pub fn build_candidate_pool(full: &FrequencyTable, recent: &FrequencyTable) -> Result<Vec<u8>> {
    let mut pool = full.top(TOP_FULL);
    pool.extend(recent.top(TOP_RECENT));
    pool.sort();
    pool.dedup();
    if pool.len() > POOL_LIMIT {
        bail!(LottoError::PoolTooLarge {
            size: pool.len(),
            limit: POOL_LIMIT,
        });
    }
    Ok(pool)
}

/// Énumère C(pool, 6), filtre sur la fenêtre de somme stricte puis, si moins
/// de 5 grilles survivent, rejoue la même passe avec la fenêtre élargie.
/// Le résultat de la passe élargie remplace alors entièrement celui de la
/// passe stricte.
pub fn recommend(
    pool: &[u8],
    thresholds: &ThresholdProfile,
    history: &[Draw],
    full: &FrequencyTable,
    recent: &FrequencyTable,
) -> Result<Recommendation> {
    if pool.len() > POOL_LIMIT {
        bail!(LottoError::PoolTooLarge {
            size: pool.len(),
            limit: POOL_LIMIT,
        });
    }

    let past: HashSet<[u8; DRAW_SIZE]> = history.iter().map(|d| d.sorted_numbers()).collect();

    let strict = filter_and_score(pool, thresholds, &past, full, recent, STRICT_WIDTH);
    if strict.len() >= TARGET_COUNT {
        return Ok(Recommendation {
            suggestions: strict.into_iter().take(TARGET_COUNT).collect(),
            relaxed: false,
        });
    }

    let relaxed = filter_and_score(pool, thresholds, &past, full, recent, RELAXED_WIDTH);
    Ok(Recommendation {
        suggestions: relaxed.into_iter().take(TARGET_COUNT).collect(),
        relaxed: true,
    })
}

/// Une passe complète : énumération, filtre, score, classement.
/// `width` ne paramètre que la fenêtre de somme ; les trois autres critères
/// (parité, paires consécutives, grille inédite) ne varient jamais entre
/// les passes.
fn filter_and_score(
    pool: &[u8],
    thresholds: &ThresholdProfile,
    past: &HashSet<[u8; DRAW_SIZE]>,
    full: &FrequencyTable,
    recent: &FrequencyTable,
    width: f64,
) -> Vec<Suggestion> {
    let mut accepted = Vec::new();

    for combo in pool.iter().copied().combinations(DRAW_SIZE) {
        let sum: f64 = combo.iter().map(|&n| n as f64).sum();
        if (sum - thresholds.sum_mean).abs() > width * thresholds.sum_std_dev {
            continue;
        }
        let odds = odd_count(&combo);
        if odds != 3 && odds != 4 {
            continue;
        }
        // le pool est trié, la combinaison sort donc déjà croissante
        let numbers: [u8; DRAW_SIZE] = [combo[0], combo[1], combo[2], combo[3], combo[4], combo[5]];
        if consecutive_pairs(&numbers) > 2 {
            continue;
        }
        if past.contains(&numbers) {
            continue;
        }

        let score = 0.7 * combo_frequency(&numbers, full) + 0.3 * combo_frequency(&numbers, recent);
        accepted.push(Suggestion { numbers, score });
    }

    accepted.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.numbers.cmp(&b.numbers))
    });
    accepted
}

fn combo_frequency(numbers: &[u8; DRAW_SIZE], freq: &FrequencyTable) -> f64 {
    numbers.iter().map(|&n| freq.get(n) as f64).sum()
}
