//! Static template catalog.
//!
//! Loaded once from the bundled `data/templates.json`; catalog order is the
//! listing order.

use std::sync::LazyLock;

use crate::models::template::{Template, TemplateSummary};

static CATALOG: LazyLock<Vec<Template>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../../data/templates.json"))
        .expect("bundled template catalog is valid JSON")
});

/// All templates, or only those in `category`. `None` and `"all"` list everything.
pub fn list(category: Option<&str>) -> Vec<TemplateSummary> {
    CATALOG
        .iter()
        .filter(|t| match category {
            None | Some("all") | Some("") => true,
            Some(c) => t.category == c,
        })
        .map(TemplateSummary::from)
        .collect()
}

/// Distinct categories, sorted.
pub fn categories() -> Vec<String> {
    let mut categories: Vec<String> = CATALOG.iter().map(|t| t.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

pub fn get(name: &str) -> Option<&'static Template> {
    CATALOG.iter().find(|t| t.name == name)
}
