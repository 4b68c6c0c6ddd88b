//! Storage provider abstraction.
//!
//! Every backend implements [`StorageProvider`]: write a payload under a
//! freshly generated identifier, read or delete it by identifier, and list
//! the identifiers currently stored. Backends:
//!
//! - [`FileProvider`]: one file per record in an existing directory
//! - [`BlobProvider`]: one object per record in a blob container
//! - [`TableProvider`]: one row per record in a key-value table, reached
//!   through a [`TableClient`]
//!
//! [`build_providers`] turns a [`StorageConfig`] into the set of enabled
//! providers, validating required settings up front.

mod backends;
mod config;
mod error;
mod factory;
pub mod listing;
mod metrics;
mod traits;

pub use backends::{
    blob::BlobProvider,
    dynamo::DynamoTableClient,
    file::FileProvider,
    table::{InMemoryTable, ScanPage, TableClient, TableProvider, DATA_COLUMN, ID_COLUMN},
};
pub use config::{BlobConfig, FileConfig, StorageConfig, TableConfig};
pub use error::{StorageError, StorageResult};
pub use factory::{build_providers, Providers, MEMORY_TABLE_REGION};
pub use metrics::{StorageMetrics, Timer};
pub use traits::StorageProvider;
