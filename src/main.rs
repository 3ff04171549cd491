use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use mrt_amenities::api::{HttpEndpoint, build_query, fetch_with_fallback};
use mrt_amenities::config::{DEFAULT_OUTPUT, DEFAULT_RADIUS_M, FileConfig};
use mrt_amenities::domain::{Category, LineCatalog};
use mrt_amenities::osm::MissingCoordinates;
use mrt_amenities::output::{
    ResultTable, default_map_path, default_xlsx_path, export_xlsx, read_csv, with_csv_extension,
    write_csv_or_dump, write_map,
};
use mrt_amenities::pipeline::{self, PipelineOptions};

/// Extract points of interest around metro stations from OpenStreetMap
///
/// Examples:
///   # Food, culture and entertainment spots along the Kajang Line
///   mrt-amenities extract --line "Kajang Line" -o kajang.csv
///
///   # Wider search radius, no row IDs
///   mrt-amenities extract --line "Kelana Jaya Line" -r 800 --no-ids
///
///   # Browse a previous export on a map
///   mrt-amenities map kajang.csv
///
///   # Convert an export to a spreadsheet
///   mrt-amenities export kajang.csv
///
///   # Show the configured lines
///   mrt-amenities lines
#[derive(Parser, Debug)]
#[command(name = "mrt-amenities")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (optional, auto-searches mrt-amenities.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query Overpass for a line and write the categorized results as CSV
    Extract {
        /// Line name, e.g. "Kajang Line" (case-insensitive; defaults to the first configured line)
        #[arg(short = 'l', long)]
        line: Option<String>,

        /// Output CSV file (".csv" is appended when missing)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Search radius around each station in meters
        #[arg(short = 'r', long)]
        radius: Option<u32>,

        /// Do not add the ID column
        #[arg(long)]
        no_ids: bool,

        /// Abort when an element has no coordinates instead of skipping it
        #[arg(long)]
        strict: bool,
    },
    /// Render a previously exported CSV as an HTML map
    Map {
        /// CSV file produced by `extract`
        input: PathBuf,

        /// Output HTML file (defaults to {input}_map.html)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Convert a previously exported CSV to an Excel workbook
    Export {
        /// CSV file produced by `extract`
        input: PathBuf,

        /// Output workbook (defaults to {input} with an .xlsx extension)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// List the configured lines
    Lines,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = match cli.config {
        Some(ref path) => Some(FileConfig::load_from(path)?),
        None => FileConfig::load(),
    };
    let verbose = cli.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);
    let catalog = file_config
        .as_ref()
        .map(|c| c.catalog())
        .unwrap_or_else(LineCatalog::builtin);

    match cli.command {
        Command::Extract {
            line,
            output,
            radius,
            no_ids,
            strict,
        } => {
            let settings = ExtractSettings {
                line: line.or_else(|| file_config.as_ref().and_then(|c| c.line.clone())),
                output: output
                    .or_else(|| file_config.as_ref().and_then(|c| c.output.clone()))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
                radius: radius
                    .or_else(|| file_config.as_ref().and_then(|c| c.radius))
                    .unwrap_or(DEFAULT_RADIUS_M),
                ids: !no_ids && file_config.as_ref().map(|c| c.ids).unwrap_or(true),
                strict: strict || file_config.as_ref().map(|c| c.strict).unwrap_or(false),
                verbose,
            };
            run_extract(&catalog, &settings, file_config.as_ref())
        }
        Command::Map { input, output } => run_map(&input, output, verbose),
        Command::Export { input, output } => {
            let output_path = output.unwrap_or_else(|| default_xlsx_path(&input));
            let spinner = create_spinner("Writing Excel file...");
            let rows = export_xlsx(&input, &output_path).context("Excel export failed")?;
            spinner.finish_with_message(format!(
                "Excel file created: {} ({} rows)",
                output_path.display(),
                rows
            ));
            Ok(())
        }
        Command::Lines => {
            for line in catalog.iter() {
                println!("{} ({} stations)", line.name, line.stations.len());
                if verbose {
                    println!("  {}", line.stations.join(", "));
                }
            }
            Ok(())
        }
    }
}

struct ExtractSettings {
    line: Option<String>,
    output: PathBuf,
    radius: u32,
    ids: bool,
    strict: bool,
    verbose: bool,
}

fn run_extract(
    catalog: &LineCatalog,
    settings: &ExtractSettings,
    file_config: Option<&FileConfig>,
) -> Result<()> {
    let total_start = Instant::now();

    let line = match settings.line.as_deref() {
        Some(name) => catalog.get(name).with_context(|| {
            format!(
                "Unknown line: {}. Available lines: {}",
                name,
                catalog.names().collect::<Vec<_>>().join(", ")
            )
        })?,
        None => catalog.first().context("No lines configured")?,
    };

    let overpass_config = file_config
        .and_then(|c| c.overpass.clone())
        .unwrap_or_default();
    let output_path = with_csv_extension(&settings.output);

    println!("MRT Amenity Extractor");
    println!("=====================");
    println!();

    if settings.verbose {
        println!("Configuration:");
        println!("  Line: {} ({} stations)", line.name, line.stations.len());
        println!("  Radius: {}m", settings.radius);
        println!("  Row IDs: {}", if settings.ids { "enabled" } else { "disabled" });
        println!(
            "  Missing coordinates: {}",
            if settings.strict { "fail" } else { "skip" }
        );
        println!("  Output: {}", output_path.display());
        println!("  Overpass mirrors: {}", overpass_config.urls.len());
        println!();
    }

    let query = build_query(&line, settings.radius, overpass_config.timeout_secs);
    if settings.verbose {
        println!("Query:");
        println!("{}", query);
        println!();
    }

    let endpoints =
        HttpEndpoint::from_config(&overpass_config).context("Failed to set up Overpass client")?;

    let spinner = create_spinner(&format!("Starting extraction for {}...", line.name));
    let start = Instant::now();
    let response = fetch_with_fallback(&endpoints, &query, overpass_config.retry_delay())
        .context("Could not fetch data. Check connection.")?;
    spinner.finish_with_message(format!(
        "Fetched {} elements [{:.1}s]",
        response.elements.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Matching stations and categorizing...");
    let start = Instant::now();
    let options = PipelineOptions {
        assign_ids: settings.ids,
        missing_coordinates: if settings.strict {
            MissingCoordinates::Fail
        } else {
            MissingCoordinates::Skip
        },
    };
    let result = pipeline::run(&response, &line, options).context("Failed to process response")?;
    spinner.finish_with_message(format!(
        "Matched {} locations to {} stations [{:.1}s]",
        result.table.len(),
        result.stations,
        start.elapsed().as_secs_f32()
    ));

    if result.skipped > 0 {
        eprintln!(
            "Warning: skipped {} elements without coordinates",
            result.skipped
        );
    }

    if result.table.is_empty() {
        println!();
        println!(
            "No spots found. The station names may differ in OpenStreetMap, \
             or the radius is too small."
        );
        return Ok(());
    }

    if settings.verbose {
        print_category_summary(&result.table);
    }

    let spinner = create_spinner("Writing CSV file...");
    if let Err(e) = write_csv_or_dump(&output_path, &result.table, std::io::stdout().lock()) {
        spinner.finish_with_message("Write failed");
        eprintln!("Could not save the CSV file; the rows above were printed to stdout instead.");
        return Err(e);
    }
    spinner.finish_with_message(format!("Saved to {}", output_path.display()));

    println!();
    println!(
        "Success! Found {} locations. Total time: {:.1}s",
        result.table.len(),
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn run_map(input: &std::path::Path, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let output_path = output.unwrap_or_else(|| default_map_path(input));

    let rows = read_csv(input)?;
    if verbose {
        println!("Loaded {} rows from {}", rows.len(), input.display());
    }

    let title = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Map Viewer".to_string());
    write_map(&output_path, &rows, &title).context("Map failed")?;

    println!(
        "Map with {} markers written to {}",
        rows.len(),
        output_path.display()
    );
    Ok(())
}

fn print_category_summary(table: &ResultTable) {
    let categories = [
        Category::Food,
        Category::Culture,
        Category::Entertainment,
        Category::Leisure,
        Category::Other,
    ];

    println!("  By category:");
    for category in categories {
        let count = table
            .rows()
            .iter()
            .filter(|r| r.category == category)
            .count();
        if count > 0 {
            println!("    {:<14} {}", category.as_str(), count);
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
