//! Shared fakes and server helpers for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_meme_generator::{
    AppState,
    domain::{ChatClient, MemeRenderer, MemeRepository},
    errors::{CompletionError, RenderError, RepoError},
    models::{Caption, GeneratedMeme, RenderedMeme},
    routes::create_router,
};
use tempfile::TempDir;
use uuid::Uuid;

pub const TWO_BOX_TEMPLATE_ID: &str = "181913649";
pub const RENDERED_URL: &str = "https://i.imgflip.com/8abcde.jpg";

/// Replies with a fixed text; an empty text behaves like a missing content.
pub struct ScriptedChatClient {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedChatClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.reply.is_empty() {
            return Err(CompletionError::EmptyContent);
        }
        Ok(self.reply.clone())
    }
}

pub struct FakeRenderer {
    fail_status: Option<u16>,
    pub requests: Mutex<Vec<(String, Vec<Caption>)>>,
}

impl FakeRenderer {
    pub fn succeeding() -> Self {
        Self {
            fail_status: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MemeRenderer for FakeRenderer {
    async fn render(&self, template_id: &str, captions: &[Caption]) -> Result<RenderedMeme, RenderError> {
        self.requests
            .lock()
            .unwrap()
            .push((template_id.to_string(), captions.to_vec()));
        match self.fail_status {
            Some(status) => Err(RenderError::Status(status)),
            None => Ok(RenderedMeme {
                url: RENDERED_URL.to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct InMemoryMemeRepository {
    counter: AtomicI64,
    pub memes: Mutex<Vec<GeneratedMeme>>,
    pub counter_calls: AtomicUsize,
}

impl InMemoryMemeRepository {
    pub fn stored(&self) -> Vec<GeneratedMeme> {
        self.memes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MemeRepository for InMemoryMemeRepository {
    async fn next_sequence_index(&self) -> Result<i64, RepoError> {
        self.counter_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.counter.fetch_add(1, Ordering::SeqCst))
    }

    async fn sequence_len(&self) -> Result<i64, RepoError> {
        Ok(self.counter.load(Ordering::SeqCst))
    }

    async fn create(&self, meme: &GeneratedMeme) -> Result<(), RepoError> {
        self.memes.lock().unwrap().push(meme.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<GeneratedMeme>, RepoError> {
        Ok(self.memes.lock().unwrap().iter().find(|m| m.id == id).cloned())
    }

    async fn get_by_sequence_index(&self, index: i64) -> Result<Option<GeneratedMeme>, RepoError> {
        Ok(self
            .memes
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.sequence_index == index)
            .cloned())
    }
}

pub const DEFAULT_CATALOG: &str = r#"[
  {"id": "181913649", "name": "Drake Hotline Bling", "url": "https://i.imgflip.com/30b1gx.jpg", "box_count": 2,
   "description": "Rejects the top thing, approves the bottom thing"},
  {"id": "188390779", "name": "Woman Yelling At Cat", "url": "https://i.imgflip.com/345v97.jpg", "box_count": 2}
]"#;

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub chat: Arc<ScriptedChatClient>,
    pub renderer: Arc<FakeRenderer>,
    pub repo: Arc<InMemoryMemeRepository>,
    _catalog_dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn generate(&self) -> reqwest::Response {
        self.client
            .post(self.url("/api/generate-meme"))
            .send()
            .await
            .expect("request to test server")
    }
}

/// Starts the real router on an ephemeral port. `catalog` of `None` points
/// the app at a file that does not exist.
pub async fn spawn_app(catalog: Option<&str>, chat: ScriptedChatClient, renderer: FakeRenderer) -> TestApp {
    let catalog_dir = tempfile::tempdir().expect("temp dir");
    let catalog_path: PathBuf = catalog_dir.path().join("memes.json");
    if let Some(contents) = catalog {
        std::fs::write(&catalog_path, contents).expect("write catalog");
    }

    let chat = Arc::new(chat);
    let renderer = Arc::new(renderer);
    let repo = Arc::new(InMemoryMemeRepository::default());
    let state = AppState {
        catalog_path,
        chat_client: chat.clone(),
        renderer: renderer.clone(),
        meme_repo: repo.clone(),
    };

    let base_url = serve(create_router(Arc::new(state))).await;
    TestApp {
        base_url,
        client: reqwest::Client::new(),
        chat,
        renderer,
        repo,
        _catalog_dir: catalog_dir,
    }
}

/// Serves `router` on 127.0.0.1 with an OS-assigned port and returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}
