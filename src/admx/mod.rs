//! Administrative template model
//!
//! Typed view of an ADMX policy definition file and its localized ADML
//! resource companion. Optional XML content is carried as `Option` fields so
//! the converter never has to revisit the raw document.

pub mod parse;

pub use parse::{decode_xml_bytes, parse_adml, parse_admx};

use std::collections::HashMap;

/// Parsed ADMX policy definition file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdmxDocument {
    /// `policyNamespaces/target@prefix`, the `{AppName}` of every area name
    pub target_prefix: String,
    pub target_namespace: Option<String>,
    pub categories: Vec<Category>,
    pub policies: Vec<Policy>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub parent: Option<String>,
}

impl Category {
    pub fn root(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
        }
    }

    pub fn child(id: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Policy {
    pub name: String,
    /// Raw `class` attribute. Scope matching works on this text, see
    /// [`crate::oma::Scope::matching`].
    pub class: String,
    pub parent_category: Option<String>,
    /// `$(string.Id)` reference to the display name
    pub display_name: Option<String>,
    /// `$(string.Id)` reference to the help text
    pub explain_text: Option<String>,
    pub enumeration: Option<Enumeration>,
}

impl Policy {
    pub fn new(
        name: impl Into<String>,
        class: impl Into<String>,
        parent_category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            parent_category: Some(parent_category.into()),
            ..Default::default()
        }
    }
}

/// An `elements/enum` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub value_name: String,
    pub items: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValue {
    Decimal(u64),
    Text(String),
}

impl Enumeration {
    /// Literal values used for the sample payload, in declaration order.
    ///
    /// Numeric items win: once a block holds any decimal item its string
    /// items are ignored.
    pub fn sample_values(&self) -> Vec<String> {
        let numeric: Vec<String> = self
            .items
            .iter()
            .filter_map(|item| match item {
                EnumValue::Decimal(n) => Some(n.to_string()),
                EnumValue::Text(_) => None,
            })
            .collect();

        if !numeric.is_empty() {
            return numeric;
        }

        self.items
            .iter()
            .filter_map(|item| match item {
                EnumValue::Text(s) => Some(s.clone()),
                EnumValue::Decimal(_) => None,
            })
            .collect()
    }
}

/// Parsed ADML string table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdmlDocument {
    pub strings: HashMap<String, String>,
}

impl AdmlDocument {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.strings.get(id).map(String::as_str)
    }

    /// Resolve a `$(string.Id)` reference
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        string_ref_id(reference).and_then(|id| self.get(id))
    }
}

/// Extract `Id` from a `$(string.Id)` resource reference: the token between
/// the last `.` and the closing parenthesis.
pub fn string_ref_id(reference: &str) -> Option<&str> {
    let start = reference.rfind('.')? + 1;
    let rest = &reference[start..];
    let end = rest.find(')')?;
    let id = &rest[..end];
    if id.is_empty() { None } else { Some(id) }
}
