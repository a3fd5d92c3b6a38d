//! Policy extraction
//!
//! Joins each ADMX policy with its resolved area name and ADML strings to
//! produce one [`PolicyRecord`] per matching scope.

use super::{CategoryAreaMap, PolicyRecord, Scope, oma_uri};
use crate::admx::{AdmlDocument, AdmxDocument, Enumeration, Policy};
use crate::error::{Admx2OmaError, Result};
use tracing::{debug, warn};

const ENABLED: &str = "<enabled/>";

/// Build OMA-URI records for every policy, in declaration order.
///
/// A policy that cannot be mapped is logged and skipped. A policy whose class
/// matches no scope produces nothing.
pub fn extract(
    admx: &AdmxDocument,
    adml: &AdmlDocument,
    areas: &CategoryAreaMap,
) -> Vec<PolicyRecord> {
    let mut records = Vec::new();

    for policy in &admx.policies {
        match extract_policy(policy, adml, areas) {
            Ok(policy_records) if policy_records.is_empty() => {
                debug!(
                    "Policy '{}' has class '{}' matching no scope, dropped",
                    policy.name, policy.class
                );
            }
            Ok(policy_records) => records.extend(policy_records),
            Err(e) => warn!("Skipping policy: {}", e),
        }
    }

    records
}

fn extract_policy(
    policy: &Policy,
    adml: &AdmlDocument,
    areas: &CategoryAreaMap,
) -> Result<Vec<PolicyRecord>> {
    let category = policy
        .parent_category
        .as_deref()
        .ok_or_else(|| Admx2OmaError::MissingParentCategory(policy.name.clone()))?;
    let area = areas
        .get(category)
        .ok_or_else(|| Admx2OmaError::UnknownCategory {
            policy: policy.name.clone(),
            category: category.to_string(),
        })?;

    let help = help_text(policy, adml);
    let display_name = policy
        .display_name
        .as_deref()
        .and_then(|r| adml.resolve(r))
        .unwrap_or_default()
        .to_string();
    let value = sample_payload(policy.enumeration.as_ref());

    let records = Scope::matching(&policy.class)
        .into_iter()
        .map(|scope| PolicyRecord {
            name: policy.name.clone(),
            display_name: display_name.clone(),
            omauri: oma_uri(scope, area, &policy.name),
            value: value.clone(),
            help: help.clone(),
            scope,
        })
        .collect();

    Ok(records)
}

/// Localized help text. Commas become spaces since downstream consumers
/// split on them.
fn help_text(policy: &Policy, adml: &AdmlDocument) -> String {
    let Some(reference) = policy.explain_text.as_deref() else {
        return String::new();
    };

    match adml.resolve(reference) {
        Some(text) => text.replace(',', " "),
        None => {
            debug!(
                "No ADML string for '{}' of policy '{}'",
                reference, policy.name
            );
            String::new()
        }
    }
}

/// `<enabled/>` followed by one `<data/>` line per enumeration value
pub fn sample_payload(enumeration: Option<&Enumeration>) -> String {
    let Some(enumeration) = enumeration else {
        return ENABLED.to_string();
    };

    let mut lines = vec![ENABLED.to_string()];
    lines.extend(
        enumeration
            .sample_values()
            .into_iter()
            .map(|v| format!("<data id=\"{}\" value=\"{}\"/>", enumeration.value_name, v)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admx::{Category, EnumValue};
    use crate::oma::resolve;

    fn admx(policies: Vec<Policy>) -> AdmxDocument {
        AdmxDocument {
            target_prefix: "App".into(),
            target_namespace: None,
            categories: vec![Category::root("Cat1"), Category::child("Cat2", "Cat1")],
            policies,
        }
    }

    fn run(policies: Vec<Policy>, adml: &AdmlDocument) -> Vec<PolicyRecord> {
        let doc = admx(policies);
        let areas = resolve(&doc);
        extract(&doc, adml, &areas)
    }

    #[test]
    fn test_machine_policy_in_child_category() {
        let records = run(
            vec![Policy::new("PolicyA", "Machine", "Cat2")],
            &AdmlDocument::default(),
        );

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(
            record.omauri,
            "./Device/Vendor/MSFT/Policy/Config/App~Policy~Cat1~Cat2/PolicyA"
        );
        assert_eq!(record.value, "<enabled/>");
        assert_eq!(record.scope, Scope::Device);
        assert_eq!(record.help, "");
    }

    #[test]
    fn test_both_yields_user_then_device() {
        let records = run(
            vec![Policy::new("Shared", "Both", "Cat1")],
            &AdmlDocument::default(),
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].scope, Scope::User);
        assert_eq!(
            records[0].omauri,
            "./User/Vendor/MSFT/Policy/Config/App~Policy~Cat1/Shared"
        );
        assert_eq!(records[1].scope, Scope::Device);
        assert_eq!(
            records[1].omauri,
            "./Device/Vendor/MSFT/Policy/Config/App~Policy~Cat1/Shared"
        );
        assert_eq!(records[0].value, records[1].value);
        assert_eq!(records[0].help, records[1].help);
        assert_eq!(records[0].name, records[1].name);
    }

    #[test]
    fn test_user_policy_yields_one_record() {
        let records = run(
            vec![Policy::new("Mine", "User", "Cat2")],
            &AdmlDocument::default(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scope, Scope::User);
    }

    #[test]
    fn test_unmatched_class_dropped() {
        let records = run(
            vec![
                Policy::new("Odd", "Computer", "Cat1"),
                Policy::new("Kept", "Machine", "Cat1"),
            ],
            &AdmlDocument::default(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Kept");
    }

    #[test]
    fn test_bad_category_skips_only_that_policy() {
        let mut orphan = Policy::new("Orphan", "Machine", "Cat1");
        orphan.parent_category = None;
        let records = run(
            vec![
                Policy::new("Lost", "Machine", "Nowhere"),
                orphan,
                Policy::new("Found", "User", "Cat2"),
            ],
            &AdmlDocument::default(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Found");
    }

    #[test]
    fn test_numeric_enum_payload() {
        let mut policy = Policy::new("Modes", "Machine", "Cat1");
        policy.enumeration = Some(Enumeration {
            value_name: "Mode".into(),
            items: vec![
                EnumValue::Decimal(0),
                EnumValue::Decimal(1),
                EnumValue::Decimal(2),
            ],
        });
        let records = run(vec![policy], &AdmlDocument::default());

        assert_eq!(
            records[0].value,
            "<enabled/>\n\
             <data id=\"Mode\" value=\"0\"/>\n\
             <data id=\"Mode\" value=\"1\"/>\n\
             <data id=\"Mode\" value=\"2\"/>"
        );
    }

    #[test]
    fn test_mixed_enum_payload_keeps_numbers_only() {
        let enumeration = Enumeration {
            value_name: "Level".into(),
            items: vec![EnumValue::Text("high".into()), EnumValue::Decimal(3)],
        };
        assert_eq!(
            sample_payload(Some(&enumeration)),
            "<enabled/>\n<data id=\"Level\" value=\"3\"/>"
        );
    }

    #[test]
    fn test_empty_enum_payload() {
        let enumeration = Enumeration {
            value_name: "Level".into(),
            items: Vec::new(),
        };
        assert_eq!(sample_payload(Some(&enumeration)), "<enabled/>");
        assert_eq!(sample_payload(None), "<enabled/>");
    }

    #[test]
    fn test_help_and_display_name() {
        let mut adml = AdmlDocument::default();
        adml.strings.insert("Tip".into(), "Tip, the policy".into());
        adml.strings
            .insert("Tip_Explain".into(), "Enable, with caveats".into());

        let mut policy = Policy::new("Tip", "User", "Cat1");
        policy.display_name = Some("$(string.Tip)".into());
        policy.explain_text = Some("$(string.Tip_Explain)".into());
        let mut unknown = Policy::new("Other", "User", "Cat1");
        unknown.explain_text = Some("$(string.Missing)".into());

        let records = run(vec![policy, unknown], &adml);
        assert_eq!(records[0].help, "Enable  with caveats");
        assert!(!records[0].help.contains(','));
        assert_eq!(records[0].display_name, "Tip, the policy");
        assert_eq!(records[1].help, "");
        assert_eq!(records[1].display_name, "");
    }
}
