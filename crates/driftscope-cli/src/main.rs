mod analyse;
mod display;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use driftscope_ai::{ChatProvider, DEFAULT_API_BASE};
use driftscope_core::config::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use driftscope_core::{AnalysisRequest, Config, Highlighted};
use driftscope_store::{AnalysisStore, DuckStore, LATEST_LIMIT};

#[derive(Parser)]
#[command(
    name = "driftscope",
    version,
    about = "Find and highlight drift between a text and its translation"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Settings {
    /// DuckDB database file, or `:memory:`.
    #[arg(long, env = "DATABASE_URL", global = true)]
    database: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "DRIFT_MODEL", global = true, default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    #[arg(long, global = true, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Chat-completions endpoint base URL.
    #[arg(long, env = "OPENAI_API_BASE", global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Disable terminal colours.
    #[arg(long, global = true)]
    no_color: bool,
}

impl Settings {
    fn config(&self) -> Config {
        Config {
            connection_string: self.database.clone().unwrap_or_default(),
            api_key: self.api_key.clone().unwrap_or_default(),
            model_name: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    fn color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

#[derive(Subcommand)]
enum Command {
    /// Analyse a translation against its source, store and display the result.
    Analyse(AnalyseArgs),

    /// List the most recent stored analyses.
    Latest {
        #[arg(long, default_value_t = LATEST_LIMIT)]
        limit: usize,

        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Highlight a translation using a saved provider payload (no API call).
    Highlight {
        #[arg(long)]
        translation_file: PathBuf,

        /// JSON payload shaped like the provider's answer.
        #[arg(long)]
        analysis_file: PathBuf,

        /// Print segments as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct AnalyseArgs {
    /// Source text.
    #[arg(long, conflicts_with = "source_file", required_unless_present = "source_file")]
    source: Option<String>,

    #[arg(long)]
    source_file: Option<PathBuf>,

    /// Translated text.
    #[arg(
        long,
        conflicts_with = "translation_file",
        required_unless_present = "translation_file"
    )]
    translation: Option<String>,

    #[arg(long)]
    translation_file: Option<PathBuf>,

    /// Print the request, output and record metadata as JSON.
    #[arg(long)]
    json: bool,
}

fn open_store(config: &Config) -> anyhow::Result<DuckStore> {
    config.require_store()?;
    let store = DuckStore::open_url(&config.connection_string)
        .with_context(|| format!("opening database {}", config.connection_string))?;
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A local .env is optional.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = cli.settings.config();
    let color = cli.settings.color();
    tracing::debug!(?config, "driftscope v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Analyse(args) => {
            let source = analyse::read_text(args.source, args.source_file.as_deref())?;
            let translation =
                analyse::read_text(args.translation, args.translation_file.as_deref())?;
            let request = AnalysisRequest::new(source, translation)?;

            let provider = ChatProvider::new(&config)?.with_base_url(&cli.settings.api_base);
            let store = open_store(&config)?;
            let outcome = analyse::run_analysis(&provider, &store, &request).await?;

            if args.json {
                let json = analyse::response_json(&outcome);
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                print!("{}", display::format_record(&outcome.record, &outcome.highlighted, color));
                let recent = store.latest(LATEST_LIMIT)?;
                print!("{}", display::format_recent(&recent));
            }
        }
        Command::Latest { limit, json } => {
            let store = open_store(&config)?;
            let records = store.latest(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", display::format_recent(&records));
            }
        }
        Command::Highlight {
            translation_file,
            analysis_file,
            json,
        } => {
            let translation = std::fs::read_to_string(&translation_file)
                .with_context(|| format!("reading {}", translation_file.display()))?;
            let payload = std::fs::read_to_string(&analysis_file)
                .with_context(|| format!("reading {}", analysis_file.display()))?;
            let analysis = driftscope_core::parse_provider_text(&payload)
                .with_context(|| format!("parsing {}", analysis_file.display()))?;
            let highlighted = Highlighted::new(&translation, &analysis);

            if json {
                println!("{}", serde_json::to_string_pretty(&highlighted)?);
            } else {
                print!("{}", display::format_highlighted(&highlighted, color));
                print!("{}", display::format_drift_list(&analysis.drift_items));
            }
        }
    }

    Ok(())
}
