//! Convert Group Policy administrative templates (ADMX + ADML) into Intune
//! custom OMA-URI policy descriptors.
//!
//! ```text
//! ADMX ──parse──▶ AdmxDocument ──resolve──▶ CategoryAreaMap ─┐
//! ADML ──parse──▶ AdmlDocument ──────────────────────────────┴─extract─▶ Vec<PolicyRecord>
//! ```

pub mod admx;
pub mod config;
pub mod error;
pub mod export;
pub mod oma;
pub mod pipeline;

pub use error::{Admx2OmaError, Result};
pub use oma::{PolicyRecord, Scope};
