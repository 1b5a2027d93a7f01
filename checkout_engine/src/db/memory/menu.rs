use std::sync::Arc;

use log::*;
use tokio::sync::Mutex;

use crate::{
    db_types::MenuDocument,
    traits::{MenuStore, MenuStoreError},
};

/// An in-memory [`MenuStore`]. Clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryMenuStore {
    menu: Arc<Mutex<Option<MenuDocument>>>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_menu(menu: MenuDocument) -> Self {
        Self { menu: Arc::new(Mutex::new(Some(menu))) }
    }
}

impl MenuStore for MemoryMenuStore {
    async fn fetch(&self) -> Result<Option<MenuDocument>, MenuStoreError> {
        Ok(self.menu.lock().await.clone())
    }

    async fn save(&self, menu: MenuDocument) -> Result<MenuDocument, MenuStoreError> {
        let mut current = self.menu.lock().await;
        debug!("🍲️ Replacing menu with {} categories", menu.categories.len());
        *current = Some(menu.clone());
        Ok(menu)
    }
}
