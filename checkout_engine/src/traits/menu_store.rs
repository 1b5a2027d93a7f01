use thiserror::Error;

use crate::db_types::MenuDocument;

#[derive(Debug, Clone, Error)]
pub enum MenuStoreError {
    #[error("Menu store backend error: {0}")]
    Backend(String),
}

/// Storage for the storefront's menu. There is exactly one document; saving replaces it.
#[allow(async_fn_in_trait)]
pub trait MenuStore: Clone {
    async fn fetch(&self) -> Result<Option<MenuDocument>, MenuStoreError>;

    /// Replaces the stored menu and returns what was stored.
    async fn save(&self, menu: MenuDocument) -> Result<MenuDocument, MenuStoreError>;
}
