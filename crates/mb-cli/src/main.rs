//! Manabox Collection Viewer CLI
//!
//! Command-line tool for merging, browsing, exporting and previewing
//! Manabox collection exports.

mod logging;

use clap::{Args, Parser, Subcommand};
use mb_core::source::SOURCE_TIMEOUT;
use mb_core::{
    export_csv, export_json, load_sources, write_page, ElementId, ExportFormat, Grid,
    GridColumn, MergedCollection, PreviewController, Rect, SourceFetcher, ViewerConfig,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mb-cli")]
#[command(about = "Manabox Collection Viewer", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the collection exports come from
#[derive(Args)]
struct SourceArgs {
    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Collection export, as a path or http(s) URL
    #[arg(short, long)]
    source: Vec<String>,

    /// Directories to scan for Manabox_Collection_*.csv
    #[arg(short, long)]
    root: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured sources and their collector labels
    Sources {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Show the merged collection as a table
    Show {
        #[command(flatten)]
        sources: SourceArgs,

        /// Column filter as "Column=text" (e.g. "Foil=foil")
        #[arg(long)]
        search: Vec<String>,

        /// Filter across all columns
        #[arg(long)]
        filter: Option<String>,

        /// Page to display (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (0 shows all)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Render the merged collection as an HTML page
    Render {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Export the merged collection to a file
    Export {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output format (csv, json or html)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Look up a card's preview image and price
    Preview {
        /// Catalog identifier (Scryfall ID)
        #[arg(long)]
        id: String,

        /// Configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Price currency (eur or usd)
        #[arg(long)]
        currency: Option<String>,
    },

    /// Create a configuration file template
    InitConfig {
        /// Output path for the configuration file
        #[arg(short, long)]
        output: PathBuf,

        /// Sources to include
        #[arg(short, long)]
        source: Vec<String>,

        /// Directories to include
        #[arg(short, long)]
        root: Vec<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> mb_core::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Sources { sources } => cmd_sources(&sources),
        Commands::Show {
            sources,
            search,
            filter,
            page,
            page_size,
        } => cmd_show(&sources, &search, filter.as_deref(), page, page_size),
        Commands::Render {
            sources,
            output,
            title,
        } => cmd_render(&sources, &output, title),
        Commands::Export {
            sources,
            format,
            output,
        } => cmd_export(&sources, &format, &output),
        Commands::Preview {
            id,
            config,
            currency,
        } => cmd_preview(&id, config.as_deref(), currency.as_deref()),
        Commands::InitConfig {
            output,
            source,
            root,
        } => cmd_init_config(&output, source, root),
    }
}

/// Config file (if any) with command-line sources appended
fn load_config(args: &SourceArgs) -> mb_core::Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::new(),
    };
    config.sources.extend(args.source.iter().cloned());
    config.roots.extend(args.root.iter().cloned());
    Ok(config)
}

fn load_collection(config: &ViewerConfig) -> mb_core::Result<MergedCollection> {
    let sources = config.resolve_sources()?;
    if sources.is_empty() {
        tracing::warn!("no sources configured; the collection will be empty");
    }

    let fetcher = SourceFetcher::new(SOURCE_TIMEOUT)?;
    let collection = load_sources(&sources, |locator: &str| fetcher.fetch(locator));
    for outcome in collection.failed_sources() {
        eprintln!("Warning: could not load {}", outcome.source.locator);
    }
    Ok(collection)
}

fn cmd_sources(args: &SourceArgs) -> mb_core::Result<()> {
    let config = load_config(args)?;
    let sources = config.resolve_sources()?;

    println!("Sources ({}):", sources.len());
    for source in &sources {
        println!("  {}\t{}", source.collector, source.locator);
    }

    Ok(())
}

fn cmd_show(
    args: &SourceArgs,
    searches: &[String],
    filter: Option<&str>,
    page: usize,
    page_size: Option<usize>,
) -> mb_core::Result<()> {
    let config = load_config(args)?;
    let collection = load_collection(&config)?;
    let mut grid = Grid::build(collection, page_size.unwrap_or(config.page_size));

    for search in searches {
        let (column, value) = parse_search(search)?;
        grid.search_column(column, value);
    }
    if let Some(filter) = filter {
        grid.search_global(filter);
    }
    grid.set_page(page.saturating_sub(1));

    // Print header
    let header: Vec<&str> = grid.columns().iter().map(|c| c.header()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    let page = grid.page();
    for row in &page.rows {
        let values: Vec<&str> = row.cells.iter().map(|c| c.display_text()).collect();
        println!("{}", values.join("\t"));
    }

    println!();
    print!(
        "Showing {} to {} of {} entries",
        page.first_row(),
        page.last_row(),
        page.filtered
    );
    if page.filtered != page.total {
        print!(" (filtered from {} total entries)", page.total);
    }
    println!(" - page {} of {}", page.index + 1, page.page_count);

    Ok(())
}

/// Split "Column=text" into a grid column and its filter text
fn parse_search(search: &str) -> mb_core::Result<(GridColumn, &str)> {
    let (name, value) = search.split_once('=').ok_or_else(|| {
        mb_core::Error::InvalidArgument(format!(
            "search '{}' should look like 'Column=text'",
            search
        ))
    })?;
    let column = GridColumn::from_name(name).ok_or_else(|| {
        mb_core::Error::InvalidArgument(format!("unknown column '{}'", name))
    })?;
    Ok((column, value))
}

fn cmd_render(args: &SourceArgs, output: &Path, title: Option<String>) -> mb_core::Result<()> {
    let mut config = load_config(args)?;
    if let Some(title) = title {
        config.title = title;
    }

    let collection = load_collection(&config)?;
    let grid = Grid::build(collection, config.page_size);
    write_page(output, &grid, &config.page_options())?;

    println!("Rendered {} rows to {}", grid.rows().len(), output.display());

    Ok(())
}

fn cmd_export(args: &SourceArgs, format: &str, output: &Path) -> mb_core::Result<()> {
    let format: ExportFormat = format.parse()?;
    let config = load_config(args)?;
    let collection = load_collection(&config)?;
    let rows = collection.row_count();

    match format {
        ExportFormat::Csv => export_csv(&collection, BufWriter::new(File::create(output)?))?,
        ExportFormat::Json => export_json(&collection, BufWriter::new(File::create(output)?))?,
        ExportFormat::Html => {
            let grid = Grid::build(collection, config.page_size);
            write_page(output, &grid, &config.page_options())?;
        }
    }

    println!("Exported {} rows to {}", rows, output.display());

    Ok(())
}

fn cmd_preview(id: &str, config: Option<&Path>, currency: Option<&str>) -> mb_core::Result<()> {
    let mut config = match config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::new(),
    };
    if let Some(currency) = currency {
        config.catalog.currency = currency.parse()?;
    }

    let client = config.catalog.client()?;
    let mut preview = PreviewController::new();
    let shown = preview.activate(
        &client,
        Some(id),
        ElementId(0),
        Rect::default(),
        config.catalog.currency,
    );

    match shown {
        Some(overlay) => {
            println!("Card: {}", id);
            println!("Image: {}", overlay.image_url);
            println!("{}", overlay.price_label());
        }
        None => println!("No preview available for {}", id),
    }

    Ok(())
}

fn cmd_init_config(
    output: &Path,
    sources: Vec<String>,
    roots: Vec<PathBuf>,
) -> mb_core::Result<()> {
    let mut config = ViewerConfig::new();
    config.sources = sources;
    config.roots = roots;
    if config.sources.is_empty() && config.roots.is_empty() {
        config.sources = vec![
            "Manabox_Collection_Alice.csv".to_string(),
            "Manabox_Collection_Bob.csv".to_string(),
        ];
    }

    config.save(output)?;
    println!("Created config file: {}", output.display());
    println!("Sources: {}", config.sources.len());
    println!();
    println!("Edit the file to list your exports, then run:");
    println!("  mb-cli render --config {} --output collection.html", output.display());

    Ok(())
}
