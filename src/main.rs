use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use ami_helper::adapter::CatalogQueryAdapter;
use ami_helper::address::TagAddress;
use ami_helper::cache::QueryCache;
use ami_helper::catalog::AmiCommandCatalog;
use ami_helper::scope::get_campaign;
use ami_helper::search::CompletionSearch;
use ami_helper::settings::Settings;
use ami_helper::Result;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scope {
    #[value(name = "mc16_13TeV")]
    Mc16,
    #[value(name = "mc20_13TeV")]
    Mc20,
    #[value(name = "mc21_13p6TeV")]
    Mc21,
    #[value(name = "mc23_13p6TeV")]
    Mc23,
}

impl Scope {
    fn as_str(self) -> &'static str {
        match self {
            Scope::Mc16 => "mc16_13TeV",
            Scope::Mc20 => "mc20_13TeV",
            Scope::Mc21 => "mc21_13p6TeV",
            Scope::Mc23 => "mc23_13p6TeV",
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Resolve dataset hashtags in the AMI catalog")]
struct Args {
    /// Increase verbosity (-v for INFO, -vv for DEBUG)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Settings file, replacing the per-user one
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Commands for working with AMI hashtags
    #[command(subcommand)]
    Hashtags(HashtagCommands),
    /// Commands for working with datasets
    #[command(subcommand)]
    Datasets(DatasetCommands),
    /// Inspect or clear the query cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Debug, Subcommand)]
enum HashtagCommands {
    /// List all hashtag 4-tuples with a hashtag containing a string
    Find { scope: Scope, text: String },
    /// List all 4-tuples containing the hashtag named exactly NAME
    Exact { scope: Scope, name: String },
    /// Fill in the unknown hashtags of a 4-tuple ('-' or '_' marks an unknown one)
    Complete {
        scope: Scope,
        level1: String,
        level2: String,
        level3: String,
        level4: String,
    },
}

#[derive(Debug, Subcommand)]
enum DatasetCommands {
    /// Find datasets carrying all four hashtags
    WithHashtags {
        scope: Scope,
        level1: String,
        level2: String,
        level3: String,
        level4: String,
    },
    /// Name the production campaign of a dataset
    Campaign { scope: Scope, dataset: String },
}

#[derive(Debug, Subcommand)]
enum CacheCommands {
    /// Where the cache lives and how many queries it holds
    Stats,
    /// Every cached query with its row count
    List,
    /// Forget every cached query
    Clear,
}

fn slot(value: String) -> Option<String> {
    match value.as_str() {
        "-" | "_" => None,
        _ => Some(value),
    }
}

fn init_logging(verbose: u8, configured: &str) {
    let directive = match verbose {
        0 => configured,
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG wins over both the flags and the settings file
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    init_logging(args.verbose, &settings.log_level);

    let cache = QueryCache::new(settings.persistence_mode())?;
    let scopes = settings.scope_table();
    let adapter = CatalogQueryAdapter::new(AmiCommandCatalog::new(&settings.catalog), &cache, &scopes);
    let search = CompletionSearch::new(&adapter);

    match args.command {
        Commands::Hashtags(HashtagCommands::Find { scope, text }) => {
            let seeds = adapter.find_initial_candidates(scope.as_str(), &text)?;
            for address in search.complete_all(seeds)? {
                println!("{address}");
            }
        }
        Commands::Hashtags(HashtagCommands::Exact { scope, name }) => {
            let seed = adapter.find_unique_hashtag(scope.as_str(), &name)?;
            for address in search.complete_address(&seed)? {
                println!("{address}");
            }
        }
        Commands::Hashtags(HashtagCommands::Complete { scope, level1, level2, level3, level4 }) => {
            let partial = TagAddress::new(
                scope.as_str(),
                [slot(level1), slot(level2), slot(level3), slot(level4)],
            );
            for address in search.complete_address(&partial)? {
                println!("{address}");
            }
        }
        Commands::Datasets(DatasetCommands::WithHashtags { scope, level1, level2, level3, level4 }) => {
            let address = TagAddress::complete(scope.as_str(), [level1, level2, level3, level4]);
            for name in adapter.find_datasets(&address)? {
                println!("{name}");
            }
        }
        Commands::Datasets(DatasetCommands::Campaign { scope, dataset }) => {
            let tags = scopes.lookup(scope.as_str())?;
            println!("{}", get_campaign(tags, &dataset)?);
        }
        Commands::Cache(CacheCommands::Stats) => {
            println!("store: {:?}", cache.mode()?);
            println!("queries: {}", cache.len()?);
        }
        Commands::Cache(CacheCommands::List) => {
            for entry in cache.entries()? {
                println!("{}\t{}\t{}", entry.cached_at.to_rfc3339(), entry.row_count, entry.query);
            }
        }
        Commands::Cache(CacheCommands::Clear) => {
            println!("removed {} cached queries", cache.clear()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
