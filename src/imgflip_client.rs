use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::MemeRenderer;
use crate::errors::RenderError;
use crate::models::{Caption, RenderedMeme};

const CAPTION_IMAGE_PATH: &str = "/caption_image";

#[derive(Deserialize)]
struct CaptionImageResponse {
    success: bool,
    #[serde(default)]
    data: Option<CaptionImageData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct CaptionImageData {
    url: String,
}

/// Client for the Imgflip `caption_image` endpoint.
///
/// Credentials are fixed at construction.
pub struct ImgflipRenderer {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl ImgflipRenderer {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let base: String = base_url.into();
        Self {
            client,
            url: format!("{}{CAPTION_IMAGE_PATH}", base.trim_end_matches('/')),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Form fields for one request: template id, credentials and one
    /// `boxes[i][text]` field per caption.
    fn form_fields(&self, template_id: &str, captions: &[Caption]) -> Vec<(String, String)> {
        let mut fields = vec![
            ("template_id".to_string(), template_id.to_string()),
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ];
        fields.extend(
            captions
                .iter()
                .enumerate()
                .map(|(i, caption)| (format!("boxes[{i}][text]"), caption.text.clone())),
        );
        fields
    }
}

#[async_trait]
impl MemeRenderer for ImgflipRenderer {
    async fn render(&self, template_id: &str, captions: &[Caption]) -> Result<RenderedMeme, RenderError> {
        tracing::debug!(%template_id, boxes = captions.len(), "Imgflip: captioning image");

        let response = self
            .client
            .post(&self.url)
            .form(&self.form_fields(template_id, captions))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%template_id, %status, "Imgflip: non-success status");
            return Err(RenderError::Status(status.as_u16()));
        }

        let body: CaptionImageResponse = response.json().await?;
        match (body.success, body.data) {
            (true, Some(data)) => Ok(RenderedMeme { url: data.url }),
            (_, _) => Err(RenderError::Rejected(
                body.error_message
                    .unwrap_or_else(|| "caption_image reported failure".to_string()),
            )),
        }
    }
}
