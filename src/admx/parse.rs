//! ADMX / ADML parsing
//!
//! Turns raw template XML into the typed model. Elements are matched by local
//! name so both namespaced and bare documents are accepted. Malformed
//! categories and policies are logged and dropped; only document level
//! problems are returned as errors.

use super::{AdmlDocument, AdmxDocument, Category, EnumValue, Enumeration, Policy};
use crate::error::{Admx2OmaError, Result};
use roxmltree::{Document, Node};
use tracing::{debug, warn};

/// Decode template bytes to text, honouring a byte order mark.
///
/// Windows ships some ADML files as UTF-16, so UTF-16LE and UTF-16BE are
/// accepted alongside UTF-8.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest),
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        _ => utf8(bytes),
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Admx2OmaError::EncodingError(format!("invalid UTF-8: {}", e)))
}

fn utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Admx2OmaError::EncodingError(
            "UTF-16 content has an odd number of bytes".into(),
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| to_unit([c[0], c[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|e| Admx2OmaError::EncodingError(format!("invalid UTF-16: {}", e)))
}

/// Parse an ADMX policy definition document
pub fn parse_admx(content: &str) -> Result<AdmxDocument> {
    let doc = Document::parse(content)?;
    let root = doc.root_element();

    if root.tag_name().name() != "policyDefinitions" {
        return Err(Admx2OmaError::InvalidDocument(format!(
            "expected <policyDefinitions> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let target = child(root, "policyNamespaces")
        .and_then(|ns| child(ns, "target"))
        .ok_or_else(|| {
            Admx2OmaError::InvalidDocument("missing policyNamespaces/target".into())
        })?;
    let target_prefix = target
        .attribute("prefix")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            Admx2OmaError::InvalidDocument("policyNamespaces/target has no prefix".into())
        })?
        .to_string();

    let categories: Vec<Category> = child(root, "categories")
        .map(|node| {
            elements(node, "category")
                .filter_map(parse_category)
                .collect()
        })
        .unwrap_or_default();

    let mut policies = Vec::new();
    if let Some(node) = child(root, "policies") {
        for policy_node in elements(node, "policy") {
            match parse_policy(policy_node) {
                Ok(Some(policy)) => policies.push(policy),
                Ok(None) => {}
                Err(e) => warn!("Skipping malformed policy: {}", e),
            }
        }
    }

    debug!(
        "Parsed ADMX '{}': {} categories, {} policies",
        target_prefix,
        categories.len(),
        policies.len()
    );

    Ok(AdmxDocument {
        target_prefix,
        target_namespace: target.attribute("namespace").map(str::to_string),
        categories,
        policies,
    })
}

/// Parse an ADML resource document into its string table
pub fn parse_adml(content: &str) -> Result<AdmlDocument> {
    let doc = Document::parse(content)?;
    let root = doc.root_element();

    if root.tag_name().name() != "policyDefinitionResources" {
        return Err(Admx2OmaError::InvalidDocument(format!(
            "expected <policyDefinitionResources> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut adml = AdmlDocument::default();
    let tables = root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "stringTable");

    for table in tables {
        for node in elements(table, "string") {
            match node.attribute("id") {
                Some(id) => {
                    let text = node.text().unwrap_or_default().to_string();
                    adml.strings.insert(id.to_string(), text);
                }
                None => debug!("Ignoring ADML string without an id"),
            }
        }
    }

    Ok(adml)
}

fn parse_category(node: Node) -> Option<Category> {
    let Some(id) = node.attribute("name").filter(|n| !n.is_empty()) else {
        warn!("Skipping category without a name");
        return None;
    };

    Some(Category {
        id: id.to_string(),
        parent: parent_ref(node),
    })
}

fn parse_policy(node: Node) -> Result<Option<Policy>> {
    let Some(name) = node.attribute("name").filter(|n| !n.is_empty()) else {
        warn!("Skipping policy without a name");
        return Ok(None);
    };

    let enumeration = match child(node, "elements").and_then(|e| child(e, "enum")) {
        Some(enum_node) => parse_enumeration(name, enum_node)?,
        None => None,
    };

    Ok(Some(Policy {
        name: name.to_string(),
        class: node.attribute("class").unwrap_or_default().to_string(),
        parent_category: parent_ref(node),
        display_name: node.attribute("displayName").map(str::to_string),
        explain_text: node.attribute("explainText").map(str::to_string),
        enumeration,
    }))
}

fn parse_enumeration(policy: &str, node: Node) -> Result<Option<Enumeration>> {
    let Some(value_name) = node.attribute("valueName").or_else(|| node.attribute("id")) else {
        warn!("Policy '{}' has an enum without valueName or id, ignoring it", policy);
        return Ok(None);
    };

    let mut items = Vec::new();
    for item in elements(node, "item") {
        let Some(value) = child(item, "value") else {
            continue;
        };
        for literal in value.children().filter(|n| n.is_element()) {
            match literal.tag_name().name() {
                "decimal" | "longDecimal" => {
                    let raw = literal.attribute("value").unwrap_or_default();
                    let n = raw.trim().parse::<u64>().map_err(|_| {
                        Admx2OmaError::InvalidEnumValue {
                            policy: policy.to_string(),
                            value: raw.to_string(),
                        }
                    })?;
                    items.push(EnumValue::Decimal(n));
                }
                "string" => {
                    items.push(EnumValue::Text(
                        literal.text().unwrap_or_default().to_string(),
                    ));
                }
                _ => {}
            }
        }
    }

    Ok(Some(Enumeration {
        value_name: value_name.to_string(),
        items,
    }))
}

fn parent_ref(node: Node) -> Option<String> {
    child(node, "parentCategory")
        .and_then(|p| p.attribute("ref"))
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}
