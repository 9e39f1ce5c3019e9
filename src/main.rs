use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gistcrawl::config::LoggingConfig;
use gistcrawl::{
    Config, CrawlObserver, FilterCriteria, GistCrawler, GistFile, HttpGistClient, Mode,
};

/// Exit code for a rejected username, before the crawler is ever invoked
const ERR_INVALID_USERNAME: i32 = 3;

#[derive(Parser)]
#[command(name = "gistcrawl")]
#[command(about = "Fetch, filter and import a GitHub user's public gists")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the unfiltered gist listing as pretty-printed JSON
    Raw {
        /// GitHub username whose gists to list
        username: String,
    },

    /// Filter, download and write gist files into the output tree
    Import {
        /// GitHub username whose gists to import
        username: String,

        /// Allowed MIME types, comma separated ("*" matches any)
        #[arg(long, value_delimiter = ',')]
        types: Option<Vec<String>>,

        /// Allowed languages, comma separated ("*" matches any)
        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,

        /// Maximum file size in bytes (0 or below means unlimited)
        #[arg(long)]
        max_size: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.clone()).await?;

    init_logging(cli.verbose, &config.logging)?;
    info!("Starting gistcrawl v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Raw { username } => {
            require_valid_username(&username);
            cmd_raw(&username, &config).await
        }
        Commands::Import {
            username,
            types,
            languages,
            max_size,
        } => {
            require_valid_username(&username);

            // CLI flags override the configured filter per run
            let mut settings = config.filter.clone();
            if let Some(types) = types {
                settings.types = types;
            }
            if let Some(languages) = languages {
                settings.languages = languages;
            }
            if let Some(max_size) = max_size {
                settings.max_size = max_size;
            }

            cmd_import(&username, settings.criteria(), &config).await
        }
    }
}

/// Initialize logging based on verbosity level and configuration.
/// Logs go to stderr so raw mode's JSON on stdout stays clean.
fn init_logging(verbose: bool, logging: &LoggingConfig) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(logging.color)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
async fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Reject invalid usernames before any state is created or any request made
fn require_valid_username(username: &str) {
    if !validate_username(username) {
        eprintln!("[{}] Invalid github username.", ERR_INVALID_USERNAME);
        std::process::exit(ERR_INVALID_USERNAME);
    }
}

/// GitHub username syntax: alphanumeric with interior single hyphens, at
/// most 39 characters. Reserved route words are rejected outright.
fn validate_username(username: &str) -> bool {
    const RESERVED: [&str; 3] = ["about", "help", "pricing"];

    let lowered = username.to_ascii_lowercase();
    if RESERVED.iter().any(|word| lowered.contains(word)) {
        return false;
    }

    if username.is_empty() || username.len() > 39 {
        return false;
    }

    regex::Regex::new(r"^[A-Za-z0-9](?:-?[A-Za-z0-9])*$")
        .map(|re| re.is_match(username))
        .unwrap_or(false)
}

/// Dump the raw gist listing to stdout
async fn cmd_raw(username: &str, config: &Config) -> Result<()> {
    let mut crawler = GistCrawler::new(config.clone())?;

    if !crawler.initialize(username, FilterCriteria::default()).await {
        anyhow::bail!("Run context was already initialized");
    }

    crawler.execute(Mode::Raw).await;
    Ok(())
}

/// Import matching gist files into the output tree
async fn cmd_import(username: &str, criteria: FilterCriteria, config: &Config) -> Result<()> {
    println!("🔍 Importing gists for user: {}", username);

    let counters = Arc::new(Counters::default());
    let observer = ConsoleObserver {
        counters: Arc::clone(&counters),
    };
    let fetcher = Box::new(HttpGistClient::new(config)?);
    let mut crawler = GistCrawler::with_parts(config.clone(), fetcher, Box::new(observer));

    if !crawler.initialize(username, criteria).await {
        anyhow::bail!("Run context was already initialized");
    }

    println!(
        "   Found {} gist(s)",
        crawler.data().map_or(0, |gists| gists.len())
    );

    crawler.execute(Mode::Import).await;

    println!("\n🎉 Import complete!");
    println!(
        "   📥 Files downloaded: {}",
        counters.downloaded.load(Ordering::SeqCst)
    );
    println!(
        "   📝 Files written: {}",
        counters.written.load(Ordering::SeqCst)
    );
    println!("   📂 Output: {}", crawler.output_root().display());

    Ok(())
}

#[derive(Default)]
struct Counters {
    downloaded: AtomicUsize,
    written: AtomicUsize,
}

/// Prints per-file progress during import and feeds the final summary
struct ConsoleObserver {
    counters: Arc<Counters>,
}

impl CrawlObserver for ConsoleObserver {
    fn on_file_downloaded(&self, file: &GistFile, count: usize) {
        self.counters.downloaded.fetch_add(1, Ordering::SeqCst);
        println!("   📥 {} ({})", file.filename, count);
    }

    fn on_directory_created(&self, path: &Path) {
        println!("   📁 Created output directory: {}", path.display());
    }

    fn on_file_written(&self, file: &GistFile, directory: &Path) {
        self.counters.written.fetch_add(1, Ordering::SeqCst);
        println!("   📝 {} -> {}", file.filename, directory.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_accepts_normal_names() {
        assert!(validate_username("alice"));
        assert!(validate_username("octo-cat"));
        assert!(validate_username("a"));
        assert!(validate_username("user42"));
        assert!(validate_username(&"a".repeat(39)));
    }

    #[test]
    fn test_validate_username_rejects_bad_syntax() {
        assert!(!validate_username(""));
        assert!(!validate_username("-leading"));
        assert!(!validate_username("trailing-"));
        assert!(!validate_username("double--hyphen"));
        assert!(!validate_username("has space"));
        assert!(!validate_username(&"a".repeat(40)));
    }

    #[test]
    fn test_validate_username_rejects_reserved_words() {
        assert!(!validate_username("about"));
        assert!(!validate_username("Help"));
        assert!(!validate_username("pricing-page"));
    }
}
