//! AI meme generation service.
//!
//! `POST /api/generate-meme` picks a described template from the bundled
//! catalog, asks a chat-completion model for captions and an invitation,
//! renders the meme through Imgflip and stores the result in DynamoDB.

pub mod aws_clients;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod imgflip_client;
pub mod models;
pub mod openai_client;
pub mod parser;
pub mod prompt;
pub mod repositories;
pub mod routes;
pub mod startup;

use std::{path::PathBuf, sync::Arc};

use crate::domain::{ChatClient, MemeRenderer, MemeRepository};

/// Collaborators shared by every request handler.
pub struct AppState {
    pub catalog_path: PathBuf,
    pub chat_client: Arc<dyn ChatClient>,
    pub renderer: Arc<dyn MemeRenderer>,
    pub meme_repo: Arc<dyn MemeRepository>,
}
