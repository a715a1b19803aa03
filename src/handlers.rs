use crate::{
    AppState,
    catalog::{load_catalog, select_template},
    errors::AppError,
    models::{GenerateMemeResponse, GeneratedMeme},
    parser::parse_response,
    prompt::caption_prompt,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

/// POST /api/generate-meme
///
/// Select template, ask the model for captions, parse, render, persist.
/// Any step failing ends the request; nothing is retried.
pub async fn generate_meme(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = load_catalog(&state.catalog_path).await?;
    let template = {
        let mut rng = rand::thread_rng();
        select_template(&catalog, &mut rng).cloned()
    }
    .ok_or(AppError::NoEligibleTemplate)?;
    tracing::debug!(template_id = %template.id, template_name = %template.name, "Selected meme template");

    let raw = state.chat_client.complete(&caption_prompt(&template)).await?;
    let parsed = parse_response(&raw);

    if !parsed.is_valid() {
        tracing::error!(
            template_id = %template.id,
            raw_text = %raw,
            captions = ?parsed.captions,
            invitation = %parsed.invitation,
            "Model output did not contain captions and an invitation"
        );
        return Err(AppError::RenderOrParseFailure(format!(
            "unusable model output for template {}",
            template.id
        )));
    }
    if parsed.captions.len() != template.box_count as usize {
        tracing::warn!(
            template_id = %template.id,
            expected = template.box_count,
            got = parsed.captions.len(),
            "Caption count differs from template box count"
        );
    }

    let rendered = state
        .renderer
        .render(&template.id, &parsed.captions)
        .await
        .map_err(|e| {
            tracing::error!(
                template_id = %template.id,
                raw_text = %raw,
                captions = ?parsed.captions,
                invitation = %parsed.invitation,
                error = %e,
                "Meme rendering failed"
            );
            AppError::RenderOrParseFailure(e.to_string())
        })?;

    let sequence_index = state.meme_repo.next_sequence_index().await?;
    let meme = GeneratedMeme {
        id: Uuid::new_v4(),
        template_id: template.id,
        captions: parsed.captions,
        invitation: parsed.invitation,
        image_url: rendered.url,
        created_at: Utc::now(),
        sequence_index,
    };
    state.meme_repo.create(&meme).await?;

    tracing::info!(meme_id = %meme.id, sequence_index, "Meme generated successfully");
    Ok((
        StatusCode::CREATED,
        Json(GenerateMemeResponse {
            meme_url: meme.image_url,
            captions: meme.captions,
            invitation: meme.invitation,
        }),
    ))
}

/// Any method other than POST on the generation route.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}

pub async fn get_meme(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let meme_id = Uuid::parse_str(&id_str)?;
    tracing::debug!(%meme_id, "Fetching meme via handler");
    let maybe_meme = state.meme_repo.get_by_id(meme_id).await?;
    match maybe_meme {
        Some(meme) => Ok(Json(meme)),
        None => Err(AppError::MemeNotFound(meme_id.to_string())),
    }
}

/// Picks a stored meme by a uniformly drawn sequence index.
pub async fn random_meme(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let len = state.meme_repo.sequence_len().await?;
    if len <= 0 {
        return Err(AppError::MemeNotFound("no memes generated yet".to_string()));
    }
    let index = rand::thread_rng().gen_range(0..len);
    tracing::debug!(sequence_index = index, "Fetching random meme");

    match state.meme_repo.get_by_sequence_index(index).await? {
        Some(meme) => Ok(Json(meme)),
        None => {
            tracing::warn!(sequence_index = index, "Sequence index has no stored meme");
            Err(AppError::MemeNotFound(format!("sequence index {}", index)))
        }
    }
}
