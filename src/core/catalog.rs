use crate::domain::model::MenuItem;
use crate::utils::error::{KioskError, Result};
use std::sync::Arc;

/// Fixed, ordered menu. Order matters: the matcher scans it front to back.
#[derive(Debug, Clone)]
pub struct MenuCatalog {
    items: Vec<Arc<MenuItem>>,
}

impl MenuCatalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn all(&self) -> &[Arc<MenuItem>] {
        &self.items
    }

    pub fn by_id(&self, id: u32) -> Result<Arc<MenuItem>> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(KioskError::NotFound { id })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::new(default_menu())
    }
}

pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new(1, "돼지국밥", 9000),
        MenuItem::new(2, "순대국밥", 10000),
        MenuItem::new(3, "내장국밥", 9500),
        MenuItem::new(4, "섞어국밥", 9500),
        MenuItem::new(5, "수육 반접시", 13000),
        MenuItem::new(6, "수육 한접시", 25000),
    ]
}
