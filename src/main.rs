use axum_meme_generator::{
    AppState,
    aws_clients::{create_dynamodb_client, create_sdk_config},
    config::Config,
    errors::AppError,
    imgflip_client::ImgflipRenderer,
    openai_client::OpenAiChatClient,
    repositories::DynamoDbMemeRepository,
    routes::create_router,
    startup::init_resources,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "axum_meme_generator=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        catalog = %config.catalog_path.display(),
        model = %config.openai_model,
        "Configuration loaded"
    );

    let sdk_config = create_sdk_config(&config).await;
    let db_client = create_dynamodb_client(&sdk_config);
    init_resources(&db_client, &config.memes_table_name, &config.counters_table_name).await?;

    // One connection pool shared by both outbound APIs.
    let http = reqwest::Client::new();

    let state = Arc::new(AppState {
        catalog_path: config.catalog_path.clone(),
        chat_client: Arc::new(OpenAiChatClient::new(
            http.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
        )),
        renderer: Arc::new(ImgflipRenderer::new(
            http,
            config.imgflip_api_url.clone(),
            config.imgflip_username.clone(),
            config.imgflip_password.clone(),
        )),
        meme_repo: Arc::new(DynamoDbMemeRepository::new(
            db_client,
            config.memes_table_name.clone(),
            config.counters_table_name.clone(),
        )),
    });

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
