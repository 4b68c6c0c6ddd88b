//! Blob container backend built on `object_store`.
//!
//! Records are stored as top-level objects named after their identifier.
//! Azure containers are addressed with a storage connection string; a
//! `memory://` connection gives an in-process container for local runs and
//! tests.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use data_model::{RecordId, StorageTarget};
use futures::StreamExt;
use object_store::{
    azure::{AzureConfigKey, MicrosoftAzureBuilder},
    memory::InMemory,
    path::Path as ObjectPath,
    ObjectStore,
};
use tracing::debug;

use crate::{listing::IdCollector, BlobConfig, StorageError, StorageProvider, StorageResult};

const MEMORY_CONNECTION: &str = "memory://";

pub struct BlobProvider {
    object_store: Arc<dyn ObjectStore>,
    container: String,
}

impl BlobProvider {
    /// Builds the container client eagerly so configuration problems show up
    /// at startup rather than on the first request.
    pub fn new(config: &BlobConfig) -> StorageResult<Self> {
        config.validate()?;
        let connection = config.connection.trim();
        let object_store: Arc<dyn ObjectStore> = if connection == MEMORY_CONNECTION {
            Arc::new(InMemory::new())
        } else {
            let settings = parse_connection_string(connection)?;
            Arc::new(build_azure(&settings, &config.container)?)
        };
        debug!(container = %config.container, "created blob storage provider");
        Ok(Self::from_object_store(object_store, &config.container))
    }

    pub fn from_object_store(object_store: Arc<dyn ObjectStore>, container: &str) -> Self {
        Self {
            object_store,
            container: container.to_string(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    fn key_to_path(id: &RecordId) -> ObjectPath {
        ObjectPath::from(id.to_string())
    }

    fn unavailable(e: object_store::Error) -> StorageError {
        StorageError::unavailable(StorageTarget::Blob, e)
    }
}

/// Splits `Key=Value;Key=Value` pairs. Values may themselves contain `=`
/// (base64 account keys do).
fn parse_connection_string(connection: &str) -> StorageResult<HashMap<String, String>> {
    let mut settings = HashMap::new();
    for part in connection.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            StorageError::unconfigured(
                StorageTarget::Blob,
                format!("malformed connection string segment `{}`", part),
            )
        })?;
        settings.insert(key.trim().to_string(), value.trim().to_string());
    }
    if settings.is_empty() {
        return Err(StorageError::unconfigured(
            StorageTarget::Blob,
            "blob connection string is empty",
        ));
    }
    Ok(settings)
}

fn build_azure(
    settings: &HashMap<String, String>,
    container: &str,
) -> StorageResult<object_store::azure::MicrosoftAzure> {
    let mut builder = MicrosoftAzureBuilder::new().with_container_name(container);

    let use_emulator = settings
        .get("UseDevelopmentStorage")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    if use_emulator {
        builder = builder.with_use_emulator(true);
    } else {
        let account = settings.get("AccountName").ok_or_else(|| {
            StorageError::unconfigured(
                StorageTarget::Blob,
                "connection string has no AccountName",
            )
        })?;
        builder = builder.with_account(account);
        match (settings.get("AccountKey"), settings.get("SharedAccessSignature")) {
            (Some(key), _) => builder = builder.with_access_key(key),
            (None, Some(sas)) => builder = builder.with_config(AzureConfigKey::SasKey, sas),
            (None, None) => {
                return Err(StorageError::unconfigured(
                    StorageTarget::Blob,
                    "connection string has neither AccountKey nor SharedAccessSignature",
                ))
            }
        }
    }

    if let Some(endpoint) = settings.get("BlobEndpoint") {
        if endpoint.starts_with("http://") {
            builder = builder.with_allow_http(true);
        }
        builder = builder.with_endpoint(endpoint.clone());
    }

    builder
        .build()
        .map_err(|e| StorageError::unavailable(StorageTarget::Blob, e))
}

#[async_trait]
impl StorageProvider for BlobProvider {
    fn kind(&self) -> StorageTarget {
        StorageTarget::Blob
    }

    async fn write(&self, payload: &str) -> StorageResult<RecordId> {
        let id = RecordId::new();
        self.object_store
            .put(
                &Self::key_to_path(&id),
                Bytes::from(payload.to_owned()).into(),
            )
            .await
            .map_err(Self::unavailable)?;
        Ok(id)
    }

    async fn read(&self, id: &RecordId) -> StorageResult<String> {
        let result = self
            .object_store
            .get(&Self::key_to_path(id))
            .await
            .map_err(|e| match e {
                object_store::Error::NotFound { .. } => StorageError::NotFound { id: *id },
                e => Self::unavailable(e),
            })?;
        let bytes = result.bytes().await.map_err(Self::unavailable)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn delete(&self, id: &RecordId) -> StorageResult<()> {
        match self.object_store.delete(&Self::key_to_path(id)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(Self::unavailable(e)),
        }
    }

    async fn list(&self, limit: Option<usize>) -> StorageResult<Vec<RecordId>> {
        let mut collector = IdCollector::new(limit);
        let mut objects = self.object_store.list(None);
        while let Some(meta) = objects.next().await {
            if collector.is_full() {
                break;
            }
            let meta = meta.map_err(Self::unavailable)?;
            collector.offer(meta.location.as_ref());
        }
        Ok(collector.into_ids())
    }
}
