use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::sync::Arc;
use tracing::debug;

use crate::gateway::{IdentityGateway, LeaderboardEntry, ScoreGateway, SubmissionError};

// Partition key of the score index; every row lands in the same partition so
// the index's sort key (score) yields a ranked read.
const SCORE_PARTITION: &str = "SCORE";

pub struct DynamoScoreGateway {
    client: Client,
    table: String,
    index: String,
    identity: Arc<dyn IdentityGateway>,
}

impl DynamoScoreGateway {
    pub fn new(
        config: &aws_config::SdkConfig,
        table: String,
        index: String,
        identity: Arc<dyn IdentityGateway>,
    ) -> Self {
        DynamoScoreGateway {
            client: Client::new(config),
            table,
            index,
            identity,
        }
    }
}

#[async_trait]
impl ScoreGateway for DynamoScoreGateway {
    async fn submit(&self, score: u32) -> Result<(), SubmissionError> {
        // Credentials may have gone stale during the play-through.
        self.identity
            .refresh()
            .await
            .map_err(|e| SubmissionError::Store(e.to_string()))?;
        let player = self
            .identity
            .current_user()
            .await
            .map_err(|e| SubmissionError::Store(e.to_string()))?
            .ok_or(SubmissionError::NotSignedIn)?;

        self.client
            .put_item()
            .table_name(&self.table)
            .item("userId", AttributeValue::S(player.id))
            .item("playerName", AttributeValue::S(player.display_name))
            .item("score", AttributeValue::N(score.to_string()))
            .item(
                "timestamp",
                AttributeValue::S(chrono::Utc::now().to_rfc3339()),
            )
            .item("scorePartition", AttributeValue::S(SCORE_PARTITION.into()))
            .send()
            .await
            .map_err(|e| SubmissionError::Store(DisplayErrorContext(e).to_string()))?;
        debug!(score, "score stored");
        Ok(())
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, SubmissionError> {
        let response = self
            .client
            .query()
            .table_name(&self.table)
            .index_name(&self.index)
            .key_condition_expression("scorePartition = :partition")
            .expression_attribute_values(":partition", AttributeValue::S(SCORE_PARTITION.into()))
            .projection_expression("userId, playerName, score")
            .scan_index_forward(false)
            .limit(limit as i32)
            .send()
            .await
            .map_err(|e| SubmissionError::Store(DisplayErrorContext(e).to_string()))?;

        let entries = response
            .items()
            .iter()
            .filter_map(|item| {
                let score = item.get("score")?.as_n().ok()?.parse::<u32>().ok()?;
                let display_name = item
                    .get("playerName")
                    .or_else(|| item.get("userId"))?
                    .as_s()
                    .ok()?
                    .clone();
                Some(LeaderboardEntry {
                    display_name,
                    score,
                })
            })
            .collect();
        Ok(entries)
    }
}
