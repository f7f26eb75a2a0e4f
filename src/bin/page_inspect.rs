//! Binary entry point for inspecting pages of a database file.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use cowpage::storage::page::{PageInfo, PageKind, PageSpace};
use cowpage::{PageError, PageId, PageOptions};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "page-inspect",
    version,
    about = "Inspect raw pages of a copy-on-write B+tree database file",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    layout: LayoutArgs,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    #[arg(long, global = true, help = "Page size in bytes (overrides --config)")]
    page_size: Option<usize>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "TOML file with page options"
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the summary of one or more pages.
    Info {
        #[arg(value_name = "DB")]
        path: PathBuf,
        #[arg(value_name = "PGID", required = true)]
        ids: Vec<u64>,
    },
    /// List the elements of a branch or leaf page.
    Elements {
        #[arg(value_name = "DB")]
        path: PathBuf,
        #[arg(value_name = "PGID")]
        id: u64,
    },
    /// Hex dump a page.
    Dump {
        #[arg(value_name = "DB")]
        path: PathBuf,
        #[arg(value_name = "PGID")]
        id: u64,
        #[arg(long, help = "Bytes to dump (defaults to the whole page)")]
        len: Option<usize>,
    },
    /// Summarize every page head in the file.
    Pages {
        #[arg(value_name = "DB")]
        path: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct ElementRow {
    index: usize,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    child: Option<u64>,
    bucket: bool,
}

#[derive(Debug, Serialize)]
struct DumpRow {
    id: u64,
    len: usize,
    hex: String,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let options = resolve_options(&cli.layout)?;

    match cli.command {
        Command::Info { path, ids } => {
            let data = read_db(&path)?;
            let space = PageSpace::new(&data, &options)?;
            let infos = ids
                .into_iter()
                .map(|id| space.page(PageId(id)).map(|page| page.info()))
                .collect::<Result<Vec<_>, PageError>>()?;
            print_infos(&infos, cli.format)?;
        }
        Command::Elements { path, id } => {
            let data = read_db(&path)?;
            let space = PageSpace::new(&data, &options)?;
            let page = space.page(PageId(id))?;
            let rows = match page.kind() {
                Some(PageKind::Leaf) => page
                    .leaf_elements()?
                    .iter()
                    .enumerate()
                    .map(|(index, element)| -> Result<ElementRow, PageError> {
                        Ok(ElementRow {
                            index,
                            key: hex::encode(element.key()?),
                            value: Some(hex::encode(element.value()?)),
                            child: None,
                            bucket: element.is_bucket(),
                        })
                    })
                    .collect::<Result<Vec<_>, PageError>>()?,
                Some(PageKind::Branch) => page
                    .branch_elements()?
                    .iter()
                    .enumerate()
                    .map(|(index, element)| -> Result<ElementRow, PageError> {
                        Ok(ElementRow {
                            index,
                            key: hex::encode(element.key()?),
                            value: None,
                            child: Some(element.child().0),
                            bucket: false,
                        })
                    })
                    .collect::<Result<Vec<_>, PageError>>()?,
                _ => {
                    return Err(format!(
                        "page {id} is a {} page, not a branch or leaf",
                        page.type_name()
                    )
                    .into())
                }
            };
            print_elements(&rows, cli.format)?;
        }
        Command::Dump { path, id, len } => {
            let data = read_db(&path)?;
            let space = PageSpace::new(&data, &options)?;
            let page = space.page(PageId(id))?;
            page.trace_dump(64);
            let len = len.unwrap_or(page.extent());
            let row = DumpRow {
                id,
                len,
                hex: page.hexdump(len)?,
            };
            match cli.format {
                OutputFormat::Text => println!("{}", row.hex),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&row)?),
            }
        }
        Command::Pages { path } => {
            let data = read_db(&path)?;
            let space = PageSpace::new(&data, &options)?;
            let infos = space
                .pages()
                .map(|page| page.map(|p| p.info()))
                .collect::<Result<Vec<_>, PageError>>()?;
            print_infos(&infos, cli.format)?;
        }
    }
    Ok(())
}

fn resolve_options(args: &LayoutArgs) -> Result<PageOptions, PageError> {
    let mut options = match args.config.as_ref() {
        Some(path) => PageOptions::load(path)?,
        None => PageOptions::default(),
    };
    if let Some(page_size) = args.page_size {
        options.page_size = page_size;
    }
    options.validate()?;
    Ok(options)
}

fn read_db(path: &Path) -> Result<Vec<u8>, Box<dyn Error>> {
    std::fs::read(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()).into())
}

fn print_infos(infos: &[PageInfo], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Text => {
            println!("{:<10} {:<12} {:>8} {:>8}", "ID", "TYPE", "ITEMS", "OVRFLW");
            println!("{:=<10} {:=<12} {:=>8} {:=>8}", "", "", "", "");
            for info in infos {
                println!(
                    "{:<10} {:<12} {:>8} {:>8}",
                    info.id, info.page_type, info.count, info.overflow_count
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(infos)?),
    }
    Ok(())
}

fn print_elements(rows: &[ElementRow], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Text => {
            for row in rows {
                match (&row.value, row.child) {
                    (Some(value), _) => {
                        let marker = if row.bucket { " (bucket)" } else { "" };
                        println!("{:>5}: {} => {}{marker}", row.index, row.key, value);
                    }
                    (None, Some(child)) => {
                        println!("{:>5}: {} -> page {child}", row.index, row.key)
                    }
                    (None, None) => println!("{:>5}: {}", row.index, row.key),
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
    }
    Ok(())
}
