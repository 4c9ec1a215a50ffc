use basic_strategy::{card_label, Rule, RuleError, StrategyRow, StrategyTables, DEALER_UP_CARDS};
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rule: ConfigRule,
    #[serde(default)]
    pub generator: ConfigGenerator,
}

/// Every field is optional in the file and falls back to the standard game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub continuous_shuffle: bool,
    pub dealer_hit_on_soft17: bool,
    pub no_hole_card: bool,
    pub allow_split_aces: bool,
    pub allow_resplit_aces: bool,
    pub allow_das: bool,
    pub allow_surrender: bool,
    pub allow_surrender_vs_ace: bool,
    pub one_card_after_split_aces: bool,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = Rule::default();
        ConfigRule {
            number_of_decks: rule.number_of_decks,
            continuous_shuffle: rule.continuous_shuffle,
            dealer_hit_on_soft17: rule.dealer_hit_on_soft17,
            no_hole_card: rule.no_hole_card,
            allow_split_aces: rule.allow_split_aces,
            allow_resplit_aces: rule.allow_resplit_aces,
            allow_das: rule.allow_das,
            allow_surrender: rule.allow_surrender,
            allow_surrender_vs_ace: rule.allow_surrender_vs_ace,
            one_card_after_split_aces: rule.one_card_after_split_aces,
        }
    }
}

impl TryInto<Rule> for ConfigRule {
    type Error = ConfigError;

    fn try_into(self) -> Result<Rule, Self::Error> {
        let rule = Rule {
            number_of_decks: self.number_of_decks,
            continuous_shuffle: self.continuous_shuffle,
            dealer_hit_on_soft17: self.dealer_hit_on_soft17,
            no_hole_card: self.no_hole_card,
            allow_split_aces: self.allow_split_aces,
            allow_resplit_aces: self.allow_resplit_aces,
            allow_das: self.allow_das,
            allow_surrender: self.allow_surrender,
            allow_surrender_vs_ace: self.allow_surrender_vs_ace,
            one_card_after_split_aces: self.one_card_after_split_aces,
        };
        rule.validate()?;

        Ok(rule)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
pub enum OutputFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigGenerator {
    /// 0 uses every available core.
    pub number_of_threads: usize,
    pub output_format: OutputFormat,
}

impl Default for ConfigGenerator {
    fn default() -> Self {
        ConfigGenerator {
            number_of_threads: 0,
            output_format: OutputFormat::Text,
        }
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
    let filename = filename.as_ref();
    let file_content =
        fs::read_to_string(filename).map_err(|e| ConfigError::Io(filename.to_path_buf(), e))?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Logs to stderr, filtered by `RUST_LOG` (`info` when unset).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed, e.g. in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn render_tables(
    tables: &StrategyTables,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_text_charts(tables)),
        OutputFormat::Json => serde_json::to_string_pretty(&tables.charts()),
    }
}

/// The three charts with one letter per cell, up cards 2 to 10 then A as columns.
pub fn format_text_charts(tables: &StrategyTables) -> String {
    let mut out = String::new();
    for (title, rows) in [
        ("Hard totals", &tables.hard),
        ("Soft totals", &tables.soft),
        ("Pairs", &tables.pairs),
    ] {
        write_chart(&mut out, title, rows);
        out.push('\n');
    }
    out
}

fn write_chart(out: &mut String, title: &str, rows: &[StrategyRow]) {
    let _ = writeln!(out, "{title}");
    let _ = write!(out, "{:>4} ", "");
    for dealer_up_card in DEALER_UP_CARDS {
        let _ = write!(out, "{:>3}", card_label(dealer_up_card));
    }
    out.push('\n');

    for row in rows {
        let _ = write!(out, "{:>4} ", row.hand.label());
        for cell in &row.cells {
            let _ = write!(out, "{:>3}", cell.action.symbol());
        }
        out.push('\n');
    }
}
