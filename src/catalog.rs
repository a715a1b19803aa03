use crate::errors::CatalogError;
use crate::models::MemeTemplate;
use rand::Rng;
use rand::seq::SliceRandom;
use std::path::Path;

/// Reads the template catalog from disk. Called once per request so edits to
/// the file take effect without a restart.
pub async fn load_catalog(path: &Path) -> Result<Vec<MemeTemplate>, CatalogError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    let templates: Vec<MemeTemplate> =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), count = templates.len(), "Loaded meme catalog");
    Ok(templates)
}

/// Picks one template uniformly among those with a description.
///
/// Templates without a description are skipped, not treated as errors.
/// Returns `None` only when no template qualifies.
pub fn select_template<'a, R>(catalog: &'a [MemeTemplate], rng: &mut R) -> Option<&'a MemeTemplate>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&MemeTemplate> = catalog
        .iter()
        .filter(|t| t.description().is_some())
        .collect();
    eligible.choose(rng).copied()
}
