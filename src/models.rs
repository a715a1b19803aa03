use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the bundled template catalog (Imgflip `get_memes` shape).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MemeTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "url", alias = "imageUrl")]
    pub image_url: String,
    #[serde(alias = "boxCount")]
    pub box_count: u32,
    #[serde(default)]
    pub description: Option<String>,
}

impl MemeTemplate {
    /// The description, if present and not blank.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
}

impl Caption {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMeme {
    pub id: Uuid,
    pub template_id: String,
    pub captions: Vec<Caption>,
    pub invitation: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub sequence_index: i64,
}

/// Result of a successful Imgflip `caption_image` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMeme {
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMemeResponse {
    pub meme_url: String,
    pub captions: Vec<Caption>,
    pub invitation: String,
}
