//! ADMX to OMA-URI conversion
//!
//! Converts a single template, or every template in a PolicyDefinitions style
//! folder, and prints or exports the resulting custom OMA-URI settings.

use super::progress;
use admx2oma::config::{Config, OUTPUT_FORMATS};
use admx2oma::error::{Admx2OmaError, Result};
use admx2oma::export;
use admx2oma::oma::{PolicyRecord, Scope, partition_by_scope};
use admx2oma::pipeline::{self, Conversion};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to an ADMX file or a folder of ADMX files
    #[arg(short, long)]
    pub path: PathBuf,

    /// ADML file to use instead of looking in the language folder
    #[arg(long)]
    pub adml: Option<PathBuf>,

    /// Language folder holding the ADML files (e.g. en-us)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output folder for csv and json exports
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format: table, csv, json
    #[arg(long)]
    pub format: Option<String>,

    /// Only keep user or device settings
    #[arg(long)]
    pub scope: Option<Scope>,

    /// Show help text for each policy
    #[arg(short = 'd', long = "detailed")]
    pub detailed: bool,
}

struct Options<'a> {
    language: String,
    format: String,
    output_dir: PathBuf,
    scope: Option<Scope>,
    detailed: bool,
    adml: Option<&'a Path>,
}

pub fn convert(args: ConvertArgs, config: &Config) -> Result<()> {
    let format = args.format.clone().unwrap_or_else(|| config.format.clone());
    if !OUTPUT_FORMATS.contains(&format.as_str()) {
        return Err(Admx2OmaError::ConfigError(format!(
            "Unknown format '{}' (expected one of: {})",
            format,
            OUTPUT_FORMATS.join(", ")
        )));
    }

    if !args.path.exists() {
        return Err(Admx2OmaError::FileNotFound(args.path.clone()));
    }

    let options = Options {
        language: args
            .language
            .clone()
            .unwrap_or_else(|| config.language.clone()),
        format,
        output_dir: args
            .output
            .clone()
            .or_else(|| config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("./converted")),
        scope: args.scope,
        detailed: args.detailed,
        adml: args.adml.as_deref(),
    };

    if args.path.is_dir() {
        if options.adml.is_some() {
            return Err(Admx2OmaError::ConfigError(
                "--adml can only be used with a single ADMX file".into(),
            ));
        }
        convert_folder(&args.path, &options)
    } else {
        println!("{} ADMX template...", "Converting".cyan().bold());
        println!("→ Source: {}", args.path.display().to_string().cyan());

        let conversion = convert_one(&args.path, &options)?;
        println!("→ ADML: {}", conversion.adml_path.display().to_string().cyan());
        emit(&conversion, &options)
    }
}

fn convert_one(admx_path: &Path, options: &Options) -> Result<Conversion> {
    let mut conversion = pipeline::convert_admx(admx_path, &options.language, options.adml)?;

    if let Some(scope) = options.scope {
        conversion.records.retain(|r| r.scope == scope);
    }

    Ok(conversion)
}

fn convert_folder(dir: &Path, options: &Options) -> Result<()> {
    println!("{} ADMX templates...", "Converting".cyan().bold());
    println!("→ Folder: {}", dir.display().to_string().cyan());
    println!("→ Language: {}", options.language.cyan());

    let files = pipeline::find_admx_files(dir)?;
    if files.is_empty() {
        println!("\n{} No .admx files found", "ℹ".yellow());
        return Ok(());
    }

    let bar = progress::template_bar(files.len() as u64);

    let outcome = pipeline::convert_batch(&files, |file| {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        bar.set_message(name.clone());

        let result = convert_one(file, options).and_then(|conversion| {
            if options.format != "table" {
                write_exports(&conversion, options)?;
            }
            Ok(conversion)
        });
        if let Err(e) = &result {
            bar.println(format!("  {} {}: {}", "✗".red(), name, e));
        }
        bar.inc(1);
        result
    });

    progress::finish_templates(&bar, outcome.converted.len(), outcome.failures.len());

    println!("\n{} Templates:", "→".cyan().bold());
    for conversion in &outcome.converted {
        let (user, device) = partition_by_scope(&conversion.records);
        println!(
            "  {} {} ({} user, {} device)",
            conversion.file_id().green(),
            format!("[{}]", conversion.app_name).dimmed(),
            user.len(),
            device.len()
        );
    }

    if options.format != "table" {
        println!(
            "\n{} Exports written to: {}",
            "✓".green(),
            options.output_dir.display()
        );
    }

    outcome.check()
}

fn emit(conversion: &Conversion, options: &Options) -> Result<()> {
    print_summary(conversion);

    match options.format.as_str() {
        "csv" | "json" => {
            for path in write_exports(conversion, options)? {
                println!("  {} {}", "✓".green(), path.display());
            }
        }
        _ => print_records(&conversion.records, options.detailed),
    }

    println!("\n{} Conversion complete!", "✓".green().bold());
    Ok(())
}

fn write_exports(conversion: &Conversion, options: &Options) -> Result<Vec<PathBuf>> {
    debug!(
        "Writing {} export for {} to {}",
        options.format,
        conversion.file_id(),
        options.output_dir.display()
    );

    if options.format == "json" {
        Ok(vec![export::write_json(conversion, &options.output_dir)?])
    } else {
        export::write_csv(
            &conversion.records,
            &options.output_dir,
            &conversion.file_id(),
        )
    }
}

fn print_summary(conversion: &Conversion) {
    let (user, device) = partition_by_scope(&conversion.records);

    println!("\n{} Conversion Results:", "→".cyan().bold());
    println!("  App: {}", conversion.app_name.green());
    println!("  Categories: {}", conversion.areas.len());
    println!("  User settings: {}", user.len().to_string().green());
    println!("  Device settings: {}", device.len().to_string().green());
    println!("  ADMX ingestion OMA-URI: {}", conversion.ingestion_uri().cyan());
}

fn print_records(records: &[PolicyRecord], detailed: bool) {
    if records.is_empty() {
        println!("\n{} No policies matched", "ℹ".yellow());
        return;
    }

    println!("\n{} Settings:", "→".cyan().bold());
    for record in records {
        let scope = format!("[{}]", record.scope);
        let scope = match record.scope {
            Scope::User => scope.yellow(),
            Scope::Device => scope.cyan(),
        };

        if record.display_name.is_empty() {
            println!("\n  {} {}", scope, record.name.bold());
        } else {
            println!(
                "\n  {} {} {}",
                scope,
                record.name.bold(),
                format!("({})", record.display_name).dimmed()
            );
        }
        println!("    OMA-URI: {}", record.omauri);

        let mut lines = record.value.lines();
        if let Some(first) = lines.next() {
            println!("    Value:   {}", first);
        }
        for line in lines {
            println!("             {}", line);
        }

        if detailed && !record.help.is_empty() {
            println!("    Help:    {}", record.help.dimmed());
        }
    }
}
