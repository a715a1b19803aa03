use crate::{
    domain::MemeRepository,
    errors::RepoError,
    models::{Caption, GeneratedMeme},
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client as DynamoDbClient,
    types::{AttributeValue, ReturnValue},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{self, info};
use uuid::Uuid;

/// Partition key value of the counter row used for meme sequence indices.
pub const MEME_COUNTER: &str = "generated_memes";
const COUNTER_ATTRIBUTE: &str = "next_index";
/// Global secondary index on the memes table, hash key `sequence_index`.
pub const SEQUENCE_INDEX_NAME: &str = "sequence_index-index";

#[derive(Debug, Clone)]
pub struct DynamoDbMemeRepository {
    client: DynamoDbClient,
    table_name: String,
    counters_table_name: String,
}

impl DynamoDbMemeRepository {
    /// Creates a new repository instance configured for a memes table and a counters table.
    pub fn new(client: DynamoDbClient, table_name: String, counters_table_name: String) -> Self {
        info!(%table_name, %counters_table_name, "Initializing DynamoDbMemeRepository");
        Self {
            client,
            table_name,
            counters_table_name,
        }
    }
}

#[async_trait]
impl MemeRepository for DynamoDbMemeRepository {
    /// Increments the counter row with an `ADD` update and returns the value it held before.
    async fn next_sequence_index(&self) -> Result<i64, RepoError> {
        let resp = self
            .client
            .update_item()
            .table_name(&self.counters_table_name)
            .key("counter_name", AttributeValue::S(MEME_COUNTER.to_string()))
            .update_expression("ADD #next :one")
            .expression_attribute_names("#next", COUNTER_ATTRIBUTE)
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to increment meme counter", self.counters_table_name))
            .map_err(RepoError::BackendError)?;

        index_from_updated_counter(resp.attributes.as_ref()).ok_or_else(|| {
            RepoError::DataCorruption(format!(
                "DynamoDB (table: {}): counter update returned no '{}' value",
                self.counters_table_name, COUNTER_ATTRIBUTE
            ))
        })
    }

    async fn sequence_len(&self) -> Result<i64, RepoError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.counters_table_name)
            .key("counter_name", AttributeValue::S(MEME_COUNTER.to_string()))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to read meme counter", self.counters_table_name))
            .map_err(RepoError::BackendError)?;

        Ok(counter_len(resp.item.as_ref()))
    }

    /// Stores a `GeneratedMeme` in the DynamoDB table using PutItem.
    async fn create(&self, meme: &GeneratedMeme) -> Result<(), RepoError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(meme_to_item(meme)))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to put meme (id: {})", self.table_name, meme.id))
            .map_err(RepoError::BackendError)?;
        tracing::debug!(meme_id = %meme.id, sequence_index = meme.sequence_index, "DynamoDB: Meme stored");
        Ok(())
    }

    /// Retrieves a `GeneratedMeme` from DynamoDB using GetItem.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<GeneratedMeme>, RepoError> {
        let id_str = id.to_string();
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("meme_id", AttributeValue::S(id_str.clone()))
            .send()
            .await
            .context(format!("DynamoDB (table: {}): Failed to get meme (id: {})", self.table_name, id_str))
            .map_err(RepoError::BackendError)?;

        match resp.item {
            Some(item) => match item_to_meme(&item) {
                Some(meme) => Ok(Some(meme)),
                None => {
                    tracing::error!(meme_id = %id_str, table_name = %self.table_name, "DynamoDB: Retrieved item but failed to parse into GeneratedMeme");
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse meme data retrieved from DynamoDB table '{}' for id {}",
                        self.table_name, id_str
                    )))
                }
            },
            None => Ok(None),
        }
    }

    /// Single keyed Query against the `sequence_index` GSI.
    async fn get_by_sequence_index(&self, index: i64) -> Result<Option<GeneratedMeme>, RepoError> {
        tracing::debug!(sequence_index = index, "DynamoDB: Querying index '{}' of table '{}'", SEQUENCE_INDEX_NAME, self.table_name);
        let resp = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(SEQUENCE_INDEX_NAME)
            .key_condition_expression("sequence_index = :idx")
            .expression_attribute_values(":idx", AttributeValue::N(index.to_string()))
            .limit(1)
            .send()
            .await
            .context(format!(
                "DynamoDB: Failed to query index '{}' of table '{}'",
                SEQUENCE_INDEX_NAME, self.table_name
            ))
            .map_err(RepoError::BackendError)?;

        meme_from_query_items(resp.items.as_deref(), index, &self.table_name)
    }
}

/// `UpdatedNew` attributes of the `ADD` update hold the counter after the
/// increment; the reserved 0-based index is one less.
fn index_from_updated_counter(attributes: Option<&HashMap<String, AttributeValue>>) -> Option<i64> {
    attributes.and_then(read_counter).map(|next| next - 1)
}

/// A counter row that was never written means nothing was handed out yet.
fn counter_len(item: Option<&HashMap<String, AttributeValue>>) -> i64 {
    item.and_then(read_counter).unwrap_or(0)
}

/// First item of a sequence-index Query.
fn meme_from_query_items(
    items: Option<&[HashMap<String, AttributeValue>]>,
    index: i64,
    table_name: &str,
) -> Result<Option<GeneratedMeme>, RepoError> {
    match items.and_then(|items| items.first()) {
        Some(item) => item_to_meme(item).map(Some).ok_or_else(|| {
            RepoError::DataCorruption(format!(
                "DynamoDB: Failed to parse meme with sequence index {} in table '{}'",
                index, table_name
            ))
        }),
        None => Ok(None),
    }
}

fn read_counter(item: &HashMap<String, AttributeValue>) -> Option<i64> {
    item.get(COUNTER_ATTRIBUTE)?.as_n().ok()?.parse().ok()
}

fn meme_to_item(meme: &GeneratedMeme) -> HashMap<String, AttributeValue> {
    let captions = meme
        .captions
        .iter()
        .map(|caption| {
            AttributeValue::M(HashMap::from([(
                "text".to_string(),
                AttributeValue::S(caption.text.clone()),
            )]))
        })
        .collect();

    HashMap::from([
        ("meme_id".to_string(), AttributeValue::S(meme.id.to_string())),
        ("template_id".to_string(), AttributeValue::S(meme.template_id.clone())),
        ("captions".to_string(), AttributeValue::L(captions)),
        ("invitation".to_string(), AttributeValue::S(meme.invitation.clone())),
        ("image_url".to_string(), AttributeValue::S(meme.image_url.clone())),
        ("created_at".to_string(), AttributeValue::S(meme.created_at.to_rfc3339())),
        ("sequence_index".to_string(), AttributeValue::N(meme.sequence_index.to_string())),
    ])
}

// Helper function to convert DynamoDB item map to GeneratedMeme struct
fn item_to_meme(item: &HashMap<String, AttributeValue>) -> Option<GeneratedMeme> {
    let id = item
        .get("meme_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let template_id = item.get("template_id")?.as_s().ok()?.to_string();
    let captions = item
        .get("captions")?
        .as_l()
        .ok()?
        .iter()
        .map(|value| {
            let text = value.as_m().ok()?.get("text")?.as_s().ok()?;
            Some(Caption::new(text.as_str()))
        })
        .collect::<Option<Vec<_>>>()?;
    let invitation = item.get("invitation")?.as_s().ok()?.to_string();
    let image_url = item.get("image_url")?.as_s().ok()?.to_string();
    let created_at = DateTime::parse_from_rfc3339(item.get("created_at")?.as_s().ok()?)
        .ok()?
        .with_timezone(&Utc);
    let sequence_index = item.get("sequence_index")?.as_n().ok()?.parse().ok()?;

    Some(GeneratedMeme {
        id,
        template_id,
        captions,
        invitation,
        image_url,
        created_at,
        sequence_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meme() -> GeneratedMeme {
        GeneratedMeme {
            id: Uuid::new_v4(),
            template_id: "181913649".into(),
            captions: vec![Caption::new("Writing tests"), Caption::new("Writing more tests")],
            invitation: "Send this to your QA team".into(),
            image_url: "https://i.imgflip.com/abc123.jpg".into(),
            created_at: DateTime::parse_from_rfc3339("2026-10-19T07:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            sequence_index: 41,
        }
    }

    #[test]
    fn item_mapping_preserves_every_field() {
        let meme = sample_meme();
        let item = meme_to_item(&meme);
        assert_eq!(item.get("sequence_index"), Some(&AttributeValue::N("41".into())));
        assert_eq!(item_to_meme(&item), Some(meme));
    }

    #[test]
    fn item_missing_a_field_is_rejected() {
        let mut item = meme_to_item(&sample_meme());
        item.remove("invitation");
        assert_eq!(item_to_meme(&item), None);
    }

    #[test]
    fn reserved_index_is_one_below_updated_counter() {
        let first = HashMap::from([(COUNTER_ATTRIBUTE.to_string(), AttributeValue::N("1".into()))]);
        assert_eq!(index_from_updated_counter(Some(&first)), Some(0));
        let fifth = HashMap::from([(COUNTER_ATTRIBUTE.to_string(), AttributeValue::N("5".into()))]);
        assert_eq!(index_from_updated_counter(Some(&fifth)), Some(4));
        assert_eq!(index_from_updated_counter(None), None);
        assert_eq!(index_from_updated_counter(Some(&HashMap::new())), None);
    }

    #[test]
    fn missing_counter_row_means_zero_len() {
        assert_eq!(counter_len(None), 0);
        let item = HashMap::from([(COUNTER_ATTRIBUTE.to_string(), AttributeValue::N("3".into()))]);
        assert_eq!(counter_len(Some(&item)), 3);
    }

    #[test]
    fn query_items_decode_first_match() {
        let meme = sample_meme();
        let items = vec![meme_to_item(&meme)];
        let found = meme_from_query_items(Some(items.as_slice()), 41, "memes").unwrap();
        assert_eq!(found, Some(meme));
        assert!(meme_from_query_items(Some(&items[..0]), 41, "memes").unwrap().is_none());
        assert!(meme_from_query_items(None, 41, "memes").unwrap().is_none());

        let mut broken = meme_to_item(&sample_meme());
        broken.remove("captions");
        let err = meme_from_query_items(Some(std::slice::from_ref(&broken)), 41, "memes").unwrap_err();
        assert!(matches!(err, RepoError::DataCorruption(_)));
    }

    #[test]
    fn counter_reads_numeric_attribute() {
        let item = HashMap::from([(COUNTER_ATTRIBUTE.to_string(), AttributeValue::N("12".into()))]);
        assert_eq!(read_counter(&item), Some(12));
        assert_eq!(read_counter(&HashMap::new()), None);
    }
}
