mod cmd;

use admx2oma::config::ConfigManager;
use admx2oma::error;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "admx2oma",
    about = "Convert Group Policy ADMX templates into Intune custom OMA-URI policies",
    version,
    long_about = "Convert Group Policy administrative templates (ADMX + ADML) into Intune\n\
                  custom OMA-URI settings.\n\n\
                  Each policy becomes one setting per scope with its OMA-URI, a sample\n\
                  enabled payload and the localized help text."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an ADMX template (or a folder of templates) to OMA-URI settings
    Convert(cmd::convert::ConvertArgs),

    /// Show the OMA-URI area name resolved for each category
    Categories(cmd::categories::CategoriesArgs),

    /// Manage persistent settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current settings
    Show,

    /// Change a setting
    Set(cmd::config::SetArgs),

    /// Print the config file location
    Path,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> error::Result<()> {
    let cli = Cli::parse();

    let manager = ConfigManager::new()?;
    // A broken config file must not block `config set` or `config path`
    let config = manager.load_config();

    // Diagnostics go to stderr so exports piped from stdout stay clean
    let filter = if cli.verbose {
        "admx2oma=debug".to_string()
    } else {
        config
            .as_ref()
            .ok()
            .and_then(|c| c.log_level.clone())
            .unwrap_or_else(|| "admx2oma=warn".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert(args) => cmd::convert::convert(args, &config?)?,
        Commands::Categories(args) => cmd::categories::categories(args)?,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => cmd::config::show(&manager)?,
            ConfigCommands::Set(args) => cmd::config::set(&manager, args)?,
            ConfigCommands::Path => cmd::config::path(&manager),
        },
    }

    Ok(())
}
