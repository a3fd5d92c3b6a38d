//! OMA-URI policy descriptors
//!
//! Intune applies ingested ADMX policies through custom OMA-URI settings of
//! the form `./{Scope}/Vendor/MSFT/Policy/Config/{AreaName}/{PolicyName}`.
//! [`categories`] derives the area names, [`extract`] builds the records.

pub mod categories;
pub mod extract;

pub use categories::{CategoryAreaMap, ParentMap, resolve};
pub use extract::{extract, sample_payload};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    Device,
}

impl Scope {
    /// Scopes a policy `class` applies to, user first.
    ///
    /// Case-sensitive substring match: `User`/`Both` select user,
    /// `Device`/`Machine`/`Both` select device. Anything else selects none.
    pub fn matching(class: &str) -> Vec<Scope> {
        let mut scopes = Vec::with_capacity(2);
        if class.contains("User") || class.contains("Both") {
            scopes.push(Scope::User);
        }
        if class.contains("Device") || class.contains("Machine") || class.contains("Both") {
            scopes.push(Scope::Device);
        }
        scopes
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Device => "device",
        }
    }

    /// Leading OMA-URI segment
    pub fn uri_segment(&self) -> &'static str {
        match self {
            Scope::User => "User",
            Scope::Device => "Device",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Scope::User),
            "device" | "machine" => Ok(Scope::Device),
            other => Err(format!("unknown scope '{}' (expected user or device)", other)),
        }
    }
}

/// One custom OMA-URI setting for one policy in one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub name: String,
    /// Localized display name, empty when the ADML has none
    pub display_name: String,
    pub omauri: String,
    /// Sample enabled-state payload
    pub value: String,
    /// Localized help text with commas replaced by spaces
    pub help: String,
    pub scope: Scope,
}

pub fn oma_uri(scope: Scope, area_name: &str, policy_name: &str) -> String {
    format!(
        "./{}/Vendor/MSFT/Policy/Config/{}/{}",
        scope.uri_segment(),
        area_name,
        policy_name
    )
}

/// OMA-URI used to ingest the ADMX file itself
pub fn ingestion_uri(app_name: &str, file_id: &str) -> String {
    format!(
        "./Device/Vendor/MSFT/Policy/ConfigOperations/ADMXInstall/{}/Policy/{}",
        app_name, file_id
    )
}

/// Split records by scope, keeping declaration order within each
pub fn partition_by_scope(records: &[PolicyRecord]) -> (Vec<&PolicyRecord>, Vec<&PolicyRecord>) {
    records.iter().partition(|r| r.scope == Scope::User)
}
