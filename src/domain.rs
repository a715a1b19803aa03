use crate::errors::{CompletionError, RenderError, RepoError};
use crate::models::{Caption, GeneratedMeme, RenderedMeme};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait defining operations for storing and retrieving generated memes.
#[async_trait]
pub trait MemeRepository: Send + Sync + 'static {
    /// Atomically reserves the next sequence index (0-based).
    async fn next_sequence_index(&self) -> Result<i64, RepoError>;

    /// Number of sequence indices handed out so far.
    async fn sequence_len(&self) -> Result<i64, RepoError>;

    /// Stores a new meme record.
    async fn create(&self, meme: &GeneratedMeme) -> Result<(), RepoError>;

    /// `Ok(None)` when no meme has this id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<GeneratedMeme>, RepoError>;

    /// Retrieves the meme stamped with `index`, if one was stored.
    async fn get_by_sequence_index(&self, index: i64) -> Result<Option<GeneratedMeme>, RepoError>;
}

/// Sends a single user prompt to a chat-completion model.
#[async_trait]
pub trait ChatClient: Send + Sync + 'static {
    /// Returns the assistant's text. An absent or empty content is an error.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Renders captions onto a meme template through an external API.
#[async_trait]
pub trait MemeRenderer: Send + Sync + 'static {
    async fn render(&self, template_id: &str, captions: &[Caption]) -> Result<RenderedMeme, RenderError>;
}
