//! Altamasiva CLI - Bulk user CSV validation for school network admins
//!
//! # Main Commands
//!
//! ```bash
//! altamasiva serve                  # Start HTTP server (port 3000)
//! altamasiva import users.csv      # Parse and partition a user CSV
//! altamasiva check users.csv       # Exit non-zero when any row is invalid
//! ```
//!
//! # Utility Commands
//!
//! ```bash
//! altamasiva sample -n 10          # Generate a sample CSV
//! altamasiva export users.json     # Users JSON -> sanitized CSV
//! ```

use altamasiva::{
    detect_delimiter, detect_encoding, decode_content,
    export::{format_table, sample_csv, users_to_csv},
    import::{parse_file_auto, parse_users},
    models::UserRecord,
    password::generate_memorable_password,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "altamasiva")]
#[command(about = "Validate and partition bulk user CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a user CSV and report accepted rows and row errors
    Import {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Write the full report as JSON (default: table on stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also generate a provisioning password per accepted user
        #[arg(long)]
        passwords: bool,
    },

    /// Validate a user CSV, exit non-zero when any row is rejected
    Check {
        /// Input CSV file
        input: PathBuf,
    },

    /// Generate a sample CSV for testing
    Sample {
        /// Number of data rows
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a JSON array of users back to sanitized CSV
    Export {
        /// Input JSON file (array of user records)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            delimiter,
            output,
            passwords,
        } => cmd_import(&input, delimiter, output.as_deref(), passwords),

        Commands::Check { input } => cmd_check(&input),

        Commands::Sample { count, output } => cmd_sample(count, output.as_deref()),

        Commands::Export { input, output } => cmd_export(&input, output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_import(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
    passwords: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let bytes = fs::read(input)?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding)?;
    let used_delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    eprintln!("   Encoding: {}", encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(used_delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );

    let report = parse_users(content.as_bytes(), used_delimiter)?;
    let summary = report.summary();

    eprintln!("✅ Accepted {} of {} rows", summary.valid, summary.total);

    if !report.users.is_empty() {
        println!("{}", format_table(&report.users));
    }

    if !report.errors.is_empty() {
        eprintln!("\n❌ Rejected rows ({}):", report.errors.len());
        for error in &report.errors {
            eprintln!("   - {}", error.message);
        }
    }

    if !report.warnings.is_empty() {
        eprintln!("\n⚠️  Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            eprintln!("   - {}", warning.message);
        }
    }

    if passwords && !report.users.is_empty() {
        println!("\nContraseñas provisionales:");
        for user in &report.users {
            println!(
                "  {} -> {}",
                user.email,
                generate_memorable_password(&user.first_name, &user.last_name)
            );
        }
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking: {}", input.display());

    let outcome = parse_file_auto(input)?;
    let summary = outcome.report.summary();

    eprintln!("📊 Results: {} valid, {} invalid", summary.valid, summary.invalid);

    for error in outcome.report.errors.iter().take(10) {
        eprintln!("   - {}", error.message);
    }

    if !outcome.report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_sample(count: usize, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    write_output(&sample_csv(count), output)
}

fn cmd_export(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📦 Exporting: {}", input.display());

    let content = fs::read_to_string(input)?;
    let users: Vec<UserRecord> = serde_json::from_str(&content)?;

    eprintln!("   {} users", users.len());

    let csv = users_to_csv(&users)?;
    write_output(&csv, output)
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    altamasiva::server::start_server(port).await
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
