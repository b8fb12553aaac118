use thiserror::Error;

/// Classes d'échec du domaine. Les fonctions transportent ces valeurs dans
/// `anyhow::Error`, les frontières les retrouvent via `downcast_ref`.
#[derive(Debug, Error)]
pub enum LottoError {
    #[error("données insuffisantes : {0}")]
    DataInsufficient(String),

    #[error("pool de candidats trop grand : {size} numéros (borne {limit})")]
    PoolTooLarge { size: usize, limit: usize },

    #[error("stockage indisponible : {0}")]
    StorageUnavailable(String),

    #[error("récupération du tirage échouée : {0}")]
    Fetch(String),

    #[error("tirage invalide : {0}")]
    Validation(String),
}
