use crate::errors::AppError;
use crate::repositories::SEQUENCE_INDEX_NAME;
use aws_sdk_dynamodb::{
    Client as DynamoDbClient,
    error::SdkError as DynamoSdkError,
    types::{
        AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
        ProjectionType, ScalarAttributeType,
    },
};
use tracing;

fn attribute(name: &str, attribute_type: ScalarAttributeType) -> Result<AttributeDefinition, AppError> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(attribute_type)
        .build()
        .map_err(|e| AppError::InitError(format!("Failed to build attribute definition: {}", e)))
}

fn hash_key(name: &str) -> Result<KeySchemaElement, AppError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(KeyType::Hash)
        .build()
        .map_err(|e| AppError::InitError(format!("Failed to build key schema: {}", e)))
}

/// GSI keyed on `sequence_index`, projecting whole items so lookups by index
/// need no follow-up GetItem.
fn sequence_index_gsi() -> Result<GlobalSecondaryIndex, AppError> {
    GlobalSecondaryIndex::builder()
        .index_name(SEQUENCE_INDEX_NAME)
        .key_schema(hash_key("sequence_index")?)
        .projection(Projection::builder().projection_type(ProjectionType::All).build())
        .build()
        .map_err(|e| AppError::InitError(format!("Failed to build sequence index: {}", e)))
}

/// Creates a DynamoDB table with a single string hash key if it doesn't exist.
async fn create_table_if_not_exists(
    client: &DynamoDbClient,
    table_name: &str,
    key_attribute: &str,
    sequence_index: bool,
) -> Result<(), AppError> {
    let mut request = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(attribute(key_attribute, ScalarAttributeType::S)?)
        .key_schema(hash_key(key_attribute)?)
        .billing_mode(BillingMode::PayPerRequest);
    if sequence_index {
        request = request
            .attribute_definitions(attribute("sequence_index", ScalarAttributeType::N)?)
            .global_secondary_indexes(sequence_index_gsi()?);
    }
    let result = request.send().await;
    match result {
        Ok(_) => {
            tracing::info!("Startup: Table '{}' created successfully or setup initiated.", table_name);
            Ok(())
        }
        Err(e) => {
            if let DynamoSdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!("Startup: Table '{}' already exists, no action needed.", table_name);
                    Ok(())
                } else {
                    let context = format!("Startup: Service error creating DynamoDB table '{}'", table_name);
                    tracing::error!("{}: {:?}", context, service_err);
                    Err(AppError::InitError(format!("{}: {}", context, e)))
                }
            } else {
                let context = format!("Startup: SDK error creating DynamoDB table '{}'", table_name);
                tracing::error!("{}: {}", context, e);
                Err(AppError::InitError(format!("{}: {}", context, e)))
            }
        }
    }
}

/// Initializes the DynamoDB tables for memes (with the sequence index GSI)
/// and the sequence counter. An existing memes table is left as is.
pub async fn init_resources(
    db_client: &DynamoDbClient,
    memes_table: &str,
    counters_table: &str,
) -> Result<(), AppError> {
    tracing::info!("Startup: Initializing DynamoDB tables...");
    create_table_if_not_exists(db_client, memes_table, "meme_id", true).await?;
    create_table_if_not_exists(db_client, counters_table, "counter_name", false).await?;
    tracing::info!("Startup: DynamoDB table initialization complete.");
    Ok(())
}
