//! The common construction seam of every store.

use async_trait::async_trait;

use crate::error::DocumentStoreResult;

/// Factory trait for stores configured through a builder.
#[async_trait]
pub trait StoreBuilder: Send {
    /// The store type this builder produces.
    type Store: Send + Sync;

    /// Builds the store.
    async fn build(self) -> DocumentStoreResult<Self::Store>;
}
