use std::{collections::HashSet, fmt::Debug};

use chrono::Utc;
use log::*;
use serde::Deserialize;
use serde_json::Number;

use crate::{
    checkout_api::errors::MenuError,
    db_types::{MenuCategory, MenuDocument, MenuItem, MinorUnits},
    traits::MenuStore,
};

//--------------------------------------      MenuPayload     ---------------------------------------------------------
/// The menu shapes the admin dashboard has been known to send.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MenuPayload {
    /// `{ "menu": { "categories": [...] } }`
    Wrapped { menu: MenuInput },
    /// `{ "categories": [...] }`
    Canonical(MenuInput),
    /// `[...]`
    Bare(Vec<CategoryInput>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuInput {
    pub categories: Vec<CategoryInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<Number>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl MenuPayload {
    pub fn into_categories(self) -> Vec<CategoryInput> {
        match self {
            MenuPayload::Wrapped { menu } => menu.categories,
            MenuPayload::Canonical(menu) => menu.categories,
            MenuPayload::Bare(categories) => categories,
        }
    }

    /// Validates the payload and converts it into a canonical [`MenuDocument`] stamped with the current time.
    pub fn normalize(self) -> Result<MenuDocument, MenuError> {
        let inputs = self.into_categories();
        if inputs.is_empty() {
            return Err(MenuError::InvalidShape("The menu needs at least one category.".into()));
        }
        let mut ids = HashSet::new();
        let mut categories = Vec::with_capacity(inputs.len());
        for (i, category) in inputs.into_iter().enumerate() {
            let category_name = category.name.trim().to_string();
            if category_name.is_empty() {
                return Err(MenuError::InvalidShape(format!("Category #{} has no name.", i + 1)));
            }
            let mut items = Vec::with_capacity(category.items.len());
            for item in category.items {
                let item = normalize_item(&category_name, item)?;
                if !ids.insert(item.id.clone()) {
                    return Err(MenuError::InvalidShape(format!("Item id '{}' is used more than once.", item.id)));
                }
                items.push(item);
            }
            categories.push(MenuCategory { name: category_name, items });
        }
        Ok(MenuDocument { categories, updated_at: Utc::now() })
    }
}

fn normalize_item(category: &str, item: ItemInput) -> Result<MenuItem, MenuError> {
    let name = item.name.trim().to_string();
    if name.is_empty() {
        return Err(MenuError::InvalidShape(format!("An item in '{category}' has no name.")));
    }
    let price = item
        .price
        .as_ref()
        .ok_or_else(|| MenuError::InvalidShape(format!("'{name}' has no price.")))
        .and_then(|p| {
            MinorUnits::try_from(p).map_err(|_| MenuError::InvalidShape(format!("The price of '{name}' ({p}) is not a whole number.")))
        })?;
    if price.value() < 0 {
        return Err(MenuError::InvalidShape(format!("The price of '{name}' is negative.")));
    }
    let id = match item.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{}-{}", slug(category), slug(&name)),
    };
    let description = item.description.filter(|s| !s.trim().is_empty());
    let image = item.image.filter(|s| !s.trim().is_empty());
    Ok(MenuItem { id, name, price, description, image, available: item.available.unwrap_or(true) })
}

/// Lowercases `s` and collapses every run of non-alphanumeric characters into a single `-`.
pub fn slug(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
        } else if !result.is_empty() && !result.ends_with('-') {
            result.push('-');
        }
    }
    while result.ends_with('-') {
        result.pop();
    }
    result
}

//--------------------------------------        MenuApi       ---------------------------------------------------------
pub struct MenuApi<M> {
    store: M,
}

impl<M: Clone> Clone for MenuApi<M> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<M> Debug for MenuApi<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MenuApi")
    }
}

impl<M> MenuApi<M>
where M: MenuStore
{
    pub fn new(store: M) -> Self {
        Self { store }
    }

    /// The stored menu, or `None` if no menu has been saved yet.
    pub async fn current_menu(&self) -> Result<Option<MenuDocument>, MenuError> {
        Ok(self.store.fetch().await?)
    }

    /// Normalizes `payload` and replaces the stored menu with it. Nothing is saved if the payload is invalid.
    pub async fn replace_menu(&self, payload: MenuPayload) -> Result<MenuDocument, MenuError> {
        let menu = payload.normalize().map_err(|e| {
            info!("🍲️ Menu update refused. {e}");
            e
        })?;
        let items = menu.categories.iter().map(|c| c.items.len()).sum::<usize>();
        let saved = self.store.save(menu).await?;
        info!("🍲️ Menu updated: {} categories, {items} items", saved.categories.len());
        Ok(saved)
    }
}
