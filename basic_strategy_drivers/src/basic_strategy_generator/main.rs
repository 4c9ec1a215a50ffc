use anyhow::{bail, Context};
use basic_strategy::{Rule, StrategyTableBuilder};
use basic_strategy_drivers::{init_logging, parse_config_from_file, render_tables, OutputFormat};
use clap::Parser;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "~/.basic_strategy.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Output format, overriding the config file (text or json)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Number of decks, overriding the config file
    #[arg(short, long)]
    decks: Option<u8>,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let mut args = CommandLineArgs::parse();
    if args.config == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().context("Cannot find home directory")?;
        let config_file_path = home_dir.join(".basic_strategy.yml");
        if !config_file_path.exists() {
            bail!("Config file {} does not exist", config_file_path.display());
        }
        if config_file_path.is_dir() {
            bail!("This should be a path rather than a directory");
        }
        args.config = config_file_path.to_string_lossy().into_owned();
    }
    let args = args;

    let mut config = parse_config_from_file(&args.config)
        .with_context(|| format!("Cannot load config from {}", args.config))?;
    if let Some(decks) = args.decks {
        config.rule.number_of_decks = decks;
    }
    let output_format = args.format.unwrap_or(config.generator.output_format);
    let rule: Rule = config.rule.try_into()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.generator.number_of_threads)
        .build_global()
        .context("Cannot start the worker pool")?;
    info!(
        threads = rayon::current_num_threads(),
        config = %args.config,
        "generating basic strategy"
    );

    let tables = StrategyTableBuilder::new(rule).build();
    println!("{}", render_tables(&tables, output_format)?);

    Ok(())
}
