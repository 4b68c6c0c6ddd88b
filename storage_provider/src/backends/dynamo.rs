//! DynamoDB implementation of [`TableClient`].

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{
    config::Region,
    error::DisplayErrorContext,
    types::AttributeValue,
    Client,
};
use tracing::debug;

use super::table::{ScanPage, TableClient, DATA_COLUMN, ID_COLUMN};
use crate::TableConfig;

pub struct DynamoTableClient {
    client: Client,
    table: String,
}

impl DynamoTableClient {
    /// Credentials come from the standard AWS provider chain; region and
    /// table are taken from configuration.
    pub async fn new(config: &TableConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        debug!(region = %config.region, table = %config.table, "created dynamodb table client");
        Self {
            client: Client::new(&sdk_config),
            table: config.table.clone(),
        }
    }

    fn key(id: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([(ID_COLUMN.to_string(), AttributeValue::S(id.to_string()))])
    }

    fn string_column<'a>(
        item: &'a HashMap<String, AttributeValue>,
        column: &str,
    ) -> Option<&'a String> {
        item.get(column).and_then(|v| v.as_s().ok())
    }
}

#[async_trait]
impl TableClient for DynamoTableClient {
    async fn put_item(&self, id: &str, data: &str) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item(ID_COLUMN, AttributeValue::S(id.to_string()))
            .item(DATA_COLUMN, AttributeValue::S(data.to_string()))
            .send()
            .await
            .map_err(|e| anyhow!("dynamodb put_item failed: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<String>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .set_key(Some(Self::key(id)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| anyhow!("dynamodb get_item failed: {}", DisplayErrorContext(&e)))?;
        Ok(output
            .item()
            .and_then(|item| Self::string_column(item, DATA_COLUMN))
            .cloned())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .set_key(Some(Self::key(id)))
            .send()
            .await
            .map_err(|e| anyhow!("dynamodb delete_item failed: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn scan(
        &self,
        page_size: Option<usize>,
        start_after: Option<String>,
    ) -> Result<ScanPage> {
        let output = self
            .client
            .scan()
            .table_name(&self.table)
            .projection_expression("#id")
            .expression_attribute_names("#id", ID_COLUMN)
            .set_limit(page_size.map(|n| i32::try_from(n).unwrap_or(i32::MAX)))
            .set_exclusive_start_key(start_after.as_deref().map(Self::key))
            .send()
            .await
            .map_err(|e| anyhow!("dynamodb scan failed: {}", DisplayErrorContext(&e)))?;

        let ids = output
            .items()
            .iter()
            .filter_map(|item| Self::string_column(item, ID_COLUMN).cloned())
            .collect();
        let last_key = output
            .last_evaluated_key()
            .and_then(|key| Self::string_column(key, ID_COLUMN).cloned());
        Ok(ScanPage { ids, last_key })
    }
}
