// ==========================================
// MatShop Catalog Pipeline - CLI entry point
// ==========================================
// Operator surface for the pipeline when no admin UI is in front of it:
//   matshop-catalog import <sheet.csv|sheet.xlsx> [--images mats.zip]
//   matshop-catalog export [--format csv|xlsx] [--out catalog.csv]
//   matshop-catalog stats
// Common flags: --db <path>, --settings <settings.json>
// ==========================================

use matshop_catalog::exporter::{ExportFormat, ExportGenerator};
use matshop_catalog::importer::CatalogImporter;
use matshop_catalog::repository::CatalogRepositoryImpl;
use matshop_catalog::{logging, CatalogSettings};
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_DB_PATH: &str = "matshop.db";

struct CliArgs {
    command: String,
    positional: Vec<String>,
    db_path: String,
    settings_path: Option<String>,
    images_path: Option<String>,
    out_path: Option<String>,
    format: ExportFormat,
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  matshop-catalog import <sheet.csv|sheet.xlsx> [--images <archive.zip>]");
    eprintln!("  matshop-catalog export [--format csv|xlsx] [--out <file>]");
    eprintln!("  matshop-catalog stats");
    eprintln!("  matshop-catalog batches");
    eprintln!("common flags: --db <path> (default {DEFAULT_DB_PATH}), --settings <file.json>");
}

fn parse_args(mut args: Vec<String>) -> Result<CliArgs, String> {
    if args.is_empty() {
        return Err("missing command".to_string());
    }
    let command = args.remove(0);

    let mut parsed = CliArgs {
        command,
        positional: Vec::new(),
        db_path: DEFAULT_DB_PATH.to_string(),
        settings_path: None,
        images_path: None,
        out_path: None,
        format: ExportFormat::Csv,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => parsed.db_path = iter.next().ok_or("--db needs a value")?,
            "--settings" => parsed.settings_path = Some(iter.next().ok_or("--settings needs a value")?),
            "--images" => parsed.images_path = Some(iter.next().ok_or("--images needs a value")?),
            "--out" => parsed.out_path = Some(iter.next().ok_or("--out needs a value")?),
            "--format" => {
                let value = iter.next().ok_or("--format needs a value")?;
                parsed.format = match value.as_str() {
                    "csv" => ExportFormat::Csv,
                    "xlsx" => ExportFormat::Xlsx,
                    other => return Err(format!("unknown format: {other}")),
                };
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
            positional => parsed.positional.push(positional.to_string()),
        }
    }
    Ok(parsed)
}

async fn run(args: CliArgs) -> Result<(), Box<dyn Error>> {
    let settings = match &args.settings_path {
        Some(path) => CatalogSettings::load_from_file(path)?,
        None => CatalogSettings::default(),
    };
    let repo = Arc::new(CatalogRepositoryImpl::new(&args.db_path)?);

    match args.command.as_str() {
        "import" => {
            let sheet = args
                .positional
                .first()
                .ok_or("import needs a spreadsheet path")?;
            let archive_bytes = match &args.images_path {
                Some(path) => Some(std::fs::read(path)?),
                None => None,
            };

            let importer = CatalogImporter::with_fs_stores(repo, settings);
            let outcome = importer.run(sheet, archive_bytes.as_deref()).await?;

            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        "export" => {
            let generator = ExportGenerator::new(repo, &settings);
            let bytes = generator.export(args.format).await?;

            let default_name = match args.format {
                ExportFormat::Csv => "catalog.csv",
                ExportFormat::Xlsx => "catalog.xlsx",
            };
            let out_path = args.out_path.as_deref().unwrap_or(default_name);
            std::fs::write(out_path, &bytes)?;
            info!(path = out_path, bytes = bytes.len(), "catalog exported");
        }
        "stats" => {
            let generator = ExportGenerator::new(repo, &settings);
            let stats = generator.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        "batches" => {
            use matshop_catalog::repository::CatalogRepository;
            let batches = repo.recent_batches(20).await?;
            println!("{}", serde_json::to_string_pretty(&batches)?);
        }
        other => {
            print_usage();
            return Err(format!("unknown command: {other}").into());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init();

    info!("{} v{}", matshop_catalog::APP_NAME, matshop_catalog::VERSION);

    let args = match parse_args(std::env::args().skip(1).collect()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args).await {
        error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
