//! Builds the configured providers, one per enabled target.

use std::{collections::HashMap, sync::Arc};

use data_model::StorageTarget;
use tracing::info;

use crate::{
    backends::{
        blob::BlobProvider,
        dynamo::DynamoTableClient,
        file::FileProvider,
        table::{InMemoryTable, TableClient, TableProvider},
    },
    StorageConfig,
    StorageProvider,
    StorageResult,
    TableConfig,
};

/// Region value selecting the in-process table client.
pub const MEMORY_TABLE_REGION: &str = "memory";

pub type Providers = HashMap<StorageTarget, Arc<dyn StorageProvider>>;

pub async fn build_providers(config: &StorageConfig) -> StorageResult<Providers> {
    config.validate()?;
    let mut providers: Providers = HashMap::new();

    if let Some(file) = &config.file {
        info!(root = %file.root.display(), "enabling file storage");
        providers.insert(StorageTarget::File, Arc::new(FileProvider::new(file).await?));
    }
    if let Some(blob) = &config.blob {
        info!(container = %blob.container, "enabling blob storage");
        providers.insert(StorageTarget::Blob, Arc::new(BlobProvider::new(blob)?));
    }
    if let Some(table) = &config.table {
        info!(region = %table.region, table = %table.table, "enabling table storage");
        let client = build_table_client(table).await;
        providers.insert(
            StorageTarget::Table,
            Arc::new(TableProvider::new(client, &table.table)),
        );
    }

    Ok(providers)
}

async fn build_table_client(config: &TableConfig) -> Arc<dyn TableClient> {
    if config.region == MEMORY_TABLE_REGION {
        Arc::new(InMemoryTable::new())
    } else {
        Arc::new(DynamoTableClient::new(config).await)
    }
}
