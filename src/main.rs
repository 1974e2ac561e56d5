//! xhs-feishu - Collect product cards and sync them to a Feishu Bitable.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use xhs_feishu::commands::{CollectCommand, PageTarget, ServeCommand, SettingsCommand, SyncCommand};
use xhs_feishu::config::{Config, OutputFormat};
use xhs_feishu::settings::SettingsPatch;

#[derive(Parser)]
#[command(
    name = "xhs-feishu",
    version,
    about = "Collect product cards from a page and sync them to a Feishu Bitable",
    long_about = "Scans a social-commerce page for product cards (ID, cover, title, price, link) \
                  and uploads them to a Feishu Bitable in batches, refreshing the tenant token as needed."
)]
struct Cli {
    /// Proxy URL for page fetches (e.g., socks5://host:port)
    #[arg(long, global = true, env = "XHS_FEISHU_PROXY")]
    proxy: Option<String>,

    /// Delay before a page fetch in milliseconds
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PageArgs {
    /// Page URL to fetch (or to resolve links against with --html)
    #[arg(short, long)]
    url: Option<String>,

    /// Saved HTML of the page instead of fetching it
    #[arg(long)]
    html: Option<PathBuf>,
}

impl PageArgs {
    fn target(self) -> PageTarget {
        PageTarget::new(self.url, self.html)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Collect product cards from a page
    #[command(alias = "c")]
    Collect {
        #[command(flatten)]
        page: PageArgs,

        /// Also save the records as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Collect (or load) records and upload them to Feishu
    #[command(alias = "s")]
    Sync {
        #[command(flatten)]
        page: PageArgs,

        /// Sync a records file written by `collect --out`
        #[arg(long, conflicts_with_all = ["url", "html"])]
        records: Option<PathBuf>,
    },

    /// Show or change the sync settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Answer JSON-lines requests on stdin/stdout
    Serve {
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the stored settings
    Show,

    /// Update stored settings; omitted fields keep their value
    Set {
        #[arg(long)]
        app_id: Option<String>,

        #[arg(long)]
        app_secret: Option<String>,

        /// Bitable app token
        #[arg(long)]
        app_token: Option<String>,

        #[arg(long)]
        table_id: Option<String>,

        /// Column that receives the product ID
        #[arg(long)]
        field_product_id: Option<String>,

        /// Column that receives the cover URL
        #[arg(long)]
        field_cover: Option<String>,

        /// Pre-issued tenant token, used when no app credentials are set
        #[arg(long)]
        tenant_access_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(settings) = cli.settings {
        config.settings_path = Some(settings);
    }

    match cli.command {
        Commands::Collect { page, out } => {
            let cmd = CollectCommand::new(config);
            let output = cmd.execute(&page.target(), out).await?;
            println!("{}", output);
        }

        Commands::Sync { page, records } => {
            let cmd = SyncCommand::new(config);
            let output = cmd.execute(&page.target(), records).await?;
            println!("{}", output);
        }

        Commands::Settings { action } => {
            let cmd = SettingsCommand::new(config);
            let output = match action {
                SettingsAction::Show => cmd.show().await?,
                SettingsAction::Set {
                    app_id,
                    app_secret,
                    app_token,
                    table_id,
                    field_product_id,
                    field_cover,
                    tenant_access_token,
                } => {
                    let patch = SettingsPatch {
                        app_id,
                        app_secret,
                        app_token,
                        table_id,
                        field_product_id,
                        field_cover,
                        tenant_access_token,
                        token_expired_at: None,
                    };
                    cmd.set(patch).await?
                }
            };
            println!("{}", output);
        }

        Commands::Serve { page } => {
            let cmd = ServeCommand::new(config);
            cmd.execute(&page.target()).await?;
        }
    }

    Ok(())
}
