use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use classifieds_parser::batch::{parse_batch, Page, PageKind};
use classifieds_parser::config::{FetchConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use classifieds_parser::export::write_json_array;
use classifieds_parser::fetch::Fetcher;
use classifieds_parser::normalize::normalize;
use classifieds_parser::Record;

/// Extract classifieds listings from HTML into JSON
#[derive(Parser, Debug)]
#[command(name = "classifieds", version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch search pages (and optionally each post) and export them
    Scrape(ScrapeArgs),
    /// Parse saved HTML files
    Parse(ParseArgs),
}

#[derive(clap::Args, Debug)]
struct ScrapeArgs {
    /// Site location subdomain, e.g. newyork
    #[arg(short, long)]
    location: String,

    /// Category code, e.g. jjj, apa, ggg
    #[arg(short, long)]
    category: String,

    /// Number of search pages to fetch
    #[arg(short, long, default_value = "5")]
    pages: u32,

    /// Also fetch and parse every post page
    #[arg(long)]
    posts: bool,

    /// Output file (default: data/{category}_{location}_scrape.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum post pages parsed at once
    #[arg(long, default_value = "8")]
    concurrency: usize,

    /// Proxy URL
    #[arg(long, env = "CLASSIFIEDS_PROXY")]
    proxy: Option<String>,

    /// User agent sent with every request
    #[arg(long, env = "CLASSIFIEDS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    List,
    Post,
}

impl From<Kind> for PageKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::List => PageKind::List,
            Kind::Post => PageKind::Post,
        }
    }
}

#[derive(clap::Args, Debug)]
struct ParseArgs {
    /// Page layout of the input files
    #[arg(short, long, value_enum)]
    kind: Kind,

    /// URL the pages were fetched from
    #[arg(short, long, default_value = "")]
    url: String,

    /// Output file; records are printed to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum files parsed at once
    #[arg(long, default_value = "8")]
    concurrency: usize,

    /// HTML files to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    match cli.command {
        Command::Scrape(args) => scrape(args, &runtime),
        Command::Parse(args) => runtime.block_on(parse_files(args)),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn scrape(args: ScrapeArgs, runtime: &tokio::runtime::Runtime) -> Result<()> {
    let mut config = FetchConfig {
        user_agent: args.user_agent.clone(),
        timeout_secs: args.timeout,
        ..FetchConfig::default()
    };
    if let Some(proxy) = &args.proxy {
        config = config.with_proxy(proxy.as_str());
    }
    let fetcher = Fetcher::new(&config).context("failed to build HTTP client")?;

    let mut items = Vec::new();
    for page in 0..args.pages {
        let page_items = fetcher
            .fetch_list_page(&args.location, &args.category, page)
            .with_context(|| format!("failed to fetch search page {page}"))?;
        info!(page, items = page_items.len(), "search page parsed");
        if page_items.is_empty() {
            break;
        }
        items.extend(page_items);
    }

    let records: Vec<Record> = if args.posts {
        let mut pages = Vec::with_capacity(items.len());
        for url in items.iter().filter_map(|item| item.url.as_deref()) {
            match fetcher.fetch_html(url) {
                Ok(html) => pages.push(Page::new(PageKind::Post, url, html)),
                Err(e) => warn!(url, error = %e, "skipping post page"),
            }
        }
        runtime.block_on(parse_batch(pages, args.concurrency))?
    } else {
        items
            .into_iter()
            .map(|item| normalize(&item.into_record()))
            .collect()
    };

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from("data").join(format!("{}_{}_scrape.json", args.category, args.location))
    });
    write_json_array(&records, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(records = records.len(), output = %output.display(), "scrape complete");
    Ok(())
}

async fn parse_files(args: ParseArgs) -> Result<()> {
    let mut pages = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let html = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        pages.push(Page::new(args.kind.into(), args.url.as_str(), html));
    }

    let records = parse_batch(pages, args.concurrency).await?;

    match &args.output {
        Some(output) => write_json_array(&records, output)
            .with_context(|| format!("failed to write {}", output.display()))?,
        None => println!("{}", serde_json::to_string_pretty(&records)?),
    }

    Ok(())
}
