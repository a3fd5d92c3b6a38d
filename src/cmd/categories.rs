//! Category area-name inspection

use admx2oma::error::Result;
use admx2oma::{oma, pipeline};
use clap::Args;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Path to the ADMX file
    #[arg(short, long)]
    pub path: PathBuf,

    /// Print the mapping as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print each category id with the OMA-URI area name it resolves to
pub fn categories(args: CategoriesArgs) -> Result<()> {
    let admx = pipeline::load_admx(&args.path)?;
    let areas = oma::resolve(&admx);

    if args.json {
        let map: BTreeMap<&str, &str> = areas.iter().collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("→ App: {}", admx.target_prefix.green());
    if areas.is_empty() {
        println!("\n{} No categories declared", "ℹ".yellow());
        return Ok(());
    }

    let width = areas.iter().map(|(id, _)| id.len()).max().unwrap_or(0);
    println!();
    for (id, area) in areas.iter() {
        println!("  {:width$}  {}", id, area.cyan(), width = width);
    }
    println!("\n  {} categories", areas.len());

    Ok(())
}
