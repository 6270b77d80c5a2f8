use crate::core::catalog::MenuCatalog;
use crate::domain::model::MenuItem;
use std::sync::Arc;

/// Resolves free-text names from the interpretation service to catalog items.
///
/// A catalog item matches when its name is a (case-sensitive) substring of the
/// raw name; the first match in catalog order wins. Overlapping names are not
/// disambiguated, so a catalog listing both "국밥" and "순대국밥" resolves
/// "순대국밥" to whichever comes first.
#[derive(Debug, Clone)]
pub struct MenuMatcher {
    catalog: MenuCatalog,
}

impl MenuMatcher {
    pub fn new(catalog: MenuCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, raw_name: &str) -> Option<Arc<MenuItem>> {
        let found = self
            .catalog
            .all()
            .iter()
            .find(|item| raw_name.contains(item.name.as_str()))
            .cloned();
        if found.is_none() {
            tracing::debug!("No menu item matches '{}', dropping it", raw_name);
        }
        found
    }

    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> MenuMatcher {
        MenuMatcher::new(MenuCatalog::default())
    }

    #[test]
    fn test_resolve_by_containment() {
        let item = matcher().resolve("그릴드 순대국밥 1개").unwrap();
        assert_eq!(item.name, "순대국밥");
        assert_eq!(item.id, 2);
    }

    #[test]
    fn test_resolve_exact_name() {
        assert_eq!(matcher().resolve("수육 반접시").unwrap().id, 5);
    }

    #[test]
    fn test_resolve_no_match() {
        assert!(matcher().resolve("김치찌개").is_none());
        // Partial name is not enough: the catalog name must be inside the raw name.
        assert!(matcher().resolve("순대").is_none());
    }

    #[test]
    fn test_first_match_in_catalog_order_wins() {
        let catalog = MenuCatalog::new(vec![
            MenuItem::new(10, "국밥", 8000),
            MenuItem::new(11, "순대국밥", 10000),
        ]);
        let matcher = MenuMatcher::new(catalog);
        assert_eq!(matcher.resolve("순대국밥").unwrap().id, 10);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let catalog = MenuCatalog::new(vec![MenuItem::new(1, "Bibimbap", 11000)]);
        let matcher = MenuMatcher::new(catalog);
        assert!(matcher.resolve("bibimbap").is_none());
        assert!(matcher.resolve("Bibimbap x2").is_some());
    }
}
