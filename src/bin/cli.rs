use clap::{Args, Parser, Subcommand};
use fhir_capability_viewer::cli::{View, render, render_failure};
use fhir_capability_viewer::input;
use fhir_capability_viewer::{CapabilityLoader, LoadResult, LoaderConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "capview")]
#[command(about = "Fetch a FHIR CapabilityStatement and show what the server supports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CapabilityStatement and print one or more views
    Load {
        /// Server metadata URL, or a viewer link carrying it (with --link)
        target: String,
        /// View to print
        #[arg(short = 'w', long, value_enum, default_value = "overview")]
        view: View,
        /// Print every view except raw
        #[arg(long, conflicts_with = "view")]
        all: bool,
        /// Treat TARGET as a viewer address and read its `url` parameter
        #[arg(long)]
        link: bool,
        /// Print the load result as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        loader: LoaderArgs,
    },
    /// Build a shareable viewer link for a target URL
    Permalink {
        /// Server metadata URL
        target: String,
        /// Viewer base address
        #[arg(short, long)]
        base: Url,
    },
    /// Print the effective loader configuration
    Config {
        #[command(flatten)]
        loader: LoaderArgs,
    },
}

#[derive(Args)]
struct LoaderArgs {
    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Relay endpoint used when the direct request fails
    #[arg(long, conflicts_with = "no_relay")]
    relay: Option<Url>,
    /// Only try the direct request
    #[arg(long)]
    no_relay: bool,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl LoaderArgs {
    fn resolve(&self) -> std::result::Result<LoaderConfig, Box<dyn std::error::Error>> {
        let mut config = LoaderConfig::load(self.config.as_deref())?;
        if let Some(relay) = &self.relay {
            config = config.with_relay(relay.clone());
        }
        if self.no_relay {
            config = config.without_relay();
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(Duration::from_secs(timeout));
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Load {
            target,
            view,
            all,
            link,
            json,
            loader,
        } => {
            let target = if link {
                input::target_from_app_address(&target)
                    .ok_or("the link has no `url` parameter")?
            } else {
                target
            };
            let config = loader.resolve()?;
            let succeeded = load_and_print(&config, &target, view, all, json).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Permalink { target, base } => {
            let target = input::parse_target_url(&target)?;
            println!("{}", input::permalink(&base, target.as_str()));
        }
        Commands::Config { loader } => {
            let config = loader.resolve()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

async fn load_and_print(
    config: &LoaderConfig,
    target: &str,
    view: View,
    all: bool,
    json: bool,
) -> std::result::Result<bool, Box<dyn std::error::Error>> {
    let loader = CapabilityLoader::new(config)?;
    let result = loader.load(target).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result.is_success());
    }

    match &result {
        LoadResult::Success(doc) => {
            let views: &[View] = if all {
                &[
                    View::Overview,
                    View::Resources,
                    View::Interactions,
                    View::Operations,
                    View::Search,
                    View::Security,
                ]
            } else {
                std::slice::from_ref(&view)
            };

            let rendered: std::result::Result<Vec<String>, _> =
                views.iter().map(|v| render(*v, doc)).collect();
            println!("{}", rendered?.join("\n\n"));
            Ok(true)
        }
        LoadResult::Failure(failure) => {
            eprintln!("{}", render_failure(failure));
            Ok(false)
        }
    }
}
