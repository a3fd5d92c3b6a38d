//! Category resolution
//!
//! Flattens the ADMX category graph into OMA-URI area names in two phases:
//!
//! ```text
//! categories → ParentMap (id → parent id, roots self-referencing)
//!            → CategoryAreaMap (id → "{App}~Policy~[{parent}~]{id}")
//! ```
//!
//! Expansion looks only one level up. A grandchild gets its immediate
//! parent's raw id, not the parent's full ancestry, so `A > B > C` yields
//! `App~Policy~B~C` for `C`. Intune area names already deployed from this
//! shape depend on it.

use crate::admx::{AdmxDocument, Category};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Category id → immediate parent id. Roots map to themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParentMap {
    entries: BTreeMap<String, String>,
}

impl ParentMap {
    pub fn from_categories(categories: &[Category]) -> Self {
        let mut entries = BTreeMap::new();

        for category in categories {
            if category.id.is_empty() {
                warn!("Skipping category with an empty id");
                continue;
            }
            let parent = category.parent.as_deref().unwrap_or(category.id.as_str());
            if let Some(previous) = entries.insert(category.id.clone(), parent.to_string()) {
                warn!(
                    "Category '{}' declared twice, parent '{}' replaced by '{}'",
                    category.id, previous, parent
                );
            }
        }

        // Parents declared outside this document become roots of their own
        let undeclared: Vec<String> = entries
            .values()
            .filter(|parent| !entries.contains_key(parent.as_str()))
            .cloned()
            .collect();
        for id in undeclared {
            debug!("Treating undeclared parent category '{}' as a root", id);
            entries.insert(id.clone(), id);
        }

        Self { entries }
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.parent(id) == Some(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand every entry into its area name
    pub fn expand(&self, app_name: &str) -> CategoryAreaMap {
        let areas = self
            .entries
            .iter()
            .map(|(id, parent)| {
                let area = if id == parent {
                    format!("{}~Policy~{}", app_name, id)
                } else {
                    format!("{}~Policy~{}~{}", app_name, parent, id)
                };
                (id.clone(), area)
            })
            .collect();

        CategoryAreaMap { areas }
    }
}

/// Category id → OMA-URI area name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryAreaMap {
    areas: BTreeMap<String, String>,
}

impl CategoryAreaMap {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.areas.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Entries sorted by category id
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.areas.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Build the area map for a parsed ADMX document
pub fn resolve(admx: &AdmxDocument) -> CategoryAreaMap {
    if admx.target_prefix.is_empty() {
        warn!(
            "ADMX document has an empty target prefix, area names will start with '~Policy'"
        );
    }

    let parents = ParentMap::from_categories(&admx.categories);
    let areas = parents.expand(&admx.target_prefix);
    debug!(
        "Resolved {} area names for '{}'",
        areas.len(),
        admx.target_prefix
    );
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(categories: Vec<Category>) -> AdmxDocument {
        AdmxDocument {
            target_prefix: "App".into(),
            categories,
            ..Default::default()
        }
    }

    #[test]
    fn test_root_and_child() {
        let areas = resolve(&doc(vec![
            Category::root("Cat1"),
            Category::child("Cat2", "Cat1"),
        ]));
        assert_eq!(areas.len(), 2);
        assert_eq!(areas.get("Cat1"), Some("App~Policy~Cat1"));
        assert_eq!(areas.get("Cat2"), Some("App~Policy~Cat1~Cat2"));
    }

    #[test]
    fn test_self_parent_is_root() {
        let areas = resolve(&doc(vec![Category::child("Loop", "Loop")]));
        assert_eq!(areas.get("Loop"), Some("App~Policy~Loop"));
    }

    #[test]
    fn test_undeclared_parent_becomes_root() {
        let parents =
            ParentMap::from_categories(&[Category::child("Chrome", "Google:Cat_Google")]);
        assert!(parents.is_root("Google:Cat_Google"));
        assert_eq!(parents.parent("Chrome"), Some("Google:Cat_Google"));

        let areas = parents.expand("chrome");
        assert_eq!(
            areas.get("Chrome"),
            Some("chrome~Policy~Google:Cat_Google~Chrome")
        );
        assert_eq!(
            areas.get("Google:Cat_Google"),
            Some("chrome~Policy~Google:Cat_Google")
        );
    }

    #[test]
    fn test_grandchild_uses_only_immediate_parent() {
        let areas = resolve(&doc(vec![
            Category::root("A"),
            Category::child("B", "A"),
            Category::child("C", "B"),
        ]));
        assert_eq!(areas.get("B"), Some("App~Policy~A~B"));
        assert_eq!(areas.get("C"), Some("App~Policy~B~C"));
    }

    #[test]
    fn test_every_category_is_a_key_once() {
        let categories = vec![
            Category::root("R"),
            Category::child("X", "R"),
            Category::child("Y", "R"),
            Category::child("X", "Y"),
        ];
        let parents = ParentMap::from_categories(&categories);
        assert_eq!(parents.len(), 3);
        assert_eq!(parents.parent("X"), Some("Y"));
    }

    #[test]
    fn test_empty_document() {
        let areas = resolve(&doc(Vec::new()));
        assert!(areas.is_empty());
    }
}
