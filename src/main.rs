//! Pharmload CLI - import molecule spreadsheets and user rosters
//!
//! # Main Commands
//!
//! ```bash
//! pharmload import molecules.csv              # Import to normalized JSON
//! pharmload import molecules.csv -f sql       # Import to SQL insert script
//! pharmload check molecules.csv               # Header validation only
//! pharmload roster users.csv                  # Roster diagnostics
//! pharmload schema                            # Show the declared columns
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use pharmload::{
    analyze_file, check_header, dataset_to_sql, import_file, read_file_auto, MOLECULE_SCHEMA,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pharmload")]
#[command(about = "Import molecule spreadsheets into the quiz's relational model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    /// Normalized JSON document
    Json,
    /// SQL insert script
    Sql,
}

#[derive(Subcommand)]
enum Commands {
    /// Full import pipeline: spreadsheet to JSON document or SQL script
    Import {
        /// Input spreadsheet file
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the header layout only
    Check {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// Import a user roster and report diagnostics
    Roster {
        /// Input roster file
        input: PathBuf,

        /// Output file for the JSON report (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the declared column schema
    Schema,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            format,
            output,
        } => cmd_import(&input, format, output.as_deref()).await,

        Commands::Check { input } => cmd_check(&input).await,

        Commands::Roster { input, output } => cmd_roster(&input, output.as_deref()).await,

        Commands::Schema => cmd_schema(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_import(
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let report = import_file(input).await?;

    eprintln!("   Encoding: {}", report.info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.info.delimiter));
    eprintln!("   Rows: {}", report.info.row_count);
    if report.info.dropped_rows > 0 {
        eprintln!("   ⚠️  Dropped (blank DCI): {}", report.info.dropped_rows);
    }
    for classification in &report.dataset.classifications {
        eprintln!(
            "   {}: {} top-level node(s)",
            classification.name,
            classification.forest.len()
        );
    }
    for property in &report.dataset.properties {
        eprintln!("   {}: {} value(s)", property.name, property.values.len());
    }
    eprintln!("✅ Imported {} molecules", report.dataset.molecules.len());

    let content = match format {
        OutputFormat::Json => report.dataset.to_json_string()?,
        OutputFormat::Sql => dataset_to_sql(&report.dataset),
    };
    write_output(&content, output)?;

    Ok(())
}

async fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking header: {}", input.display());

    let read = read_file_auto(input).await?;
    let report = check_header(&read.header(), &MOLECULE_SCHEMA);

    if report.valid {
        eprintln!("✅ Header is valid ({} columns)", read.header().len());
        Ok(())
    } else {
        eprintln!("❌ Header is invalid:");
        for error in &report.errors {
            eprintln!("   - {}", error);
        }
        std::process::exit(1);
    }
}

async fn cmd_roster(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("👥 Analyzing roster: {}", input.display());

    let report = analyze_file(input).await?;
    eprintln!("   Users: {}", report.users.len());

    if report.warnings.is_empty() {
        eprintln!("✅ No warnings");
    } else {
        eprintln!("⚠️  {} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            eprintln!("   - {:?} (count: {})", warning.code, warning.count);
        }
    }

    let json = serde_json::to_string_pretty(&report.warnings)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_schema() -> Result<(), Box<dyn std::error::Error>> {
    println!("Declared columns:");
    for descriptor in MOLECULE_SCHEMA.iter() {
        let kind = if descriptor.unique {
            if descriptor.key {
                "unique (key)"
            } else {
                "unique"
            }
        } else if descriptor.hierarchical {
            "hierarchical"
        } else {
            "multi-valued"
        };
        println!("  {:<20} {} -> {}", kind, descriptor.property, descriptor.table);
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
