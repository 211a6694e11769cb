use clap::{ArgAction, Parser, Subcommand};
use taskflow_core::config::ConfigOverrides;
use taskflow_core::model::Filter;

#[derive(Parser, Debug)]
#[command(name = "taskflow", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskflow add "Buy milk" --due 2025-12-24
    /// Example: taskflow add "Buy milk" (Due today)
    Add {
        text: Option<String>,
        /// Due date (YYYY-MM-DD), defaults to today
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
    },
    /// List tasks
    ///
    /// Example: taskflow list
    /// Example: taskflow list --filter overdue
    List {
        /// One of all, completed, pending, overdue
        #[arg(long, value_parser = parse_filter)]
        filter: Option<Filter>,
    },
    /// Mark a task completed, or reopen a completed one
    ///
    /// Example: taskflow toggle 1766224800000
    Toggle { id: u64 },
    /// Delete a task
    ///
    /// Example: taskflow delete 1766224800000
    Delete { id: u64 },
    /// Delete every completed task after confirmation
    ///
    /// Example: taskflow clear-completed
    /// Example: taskflow clear-completed --yes
    ClearCompleted {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show total and completed counts
    ///
    /// Example: taskflow stats
    Stats,
}

fn parse_filter(raw: &str) -> Result<Filter, String> {
    raw.parse::<Filter>()
        .map_err(|err| err.message().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Alias(String),
    DefaultFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    match canonical_field.as_str() {
        "default_filter" | "filter" => {
            if remainder.is_some() {
                return Err("default_filter override cannot have subfields".to_string());
            }
            value.parse::<Filter>().map_err(|err| err.message().to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::DefaultFilter,
                value,
            })
        }
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds every `--config-override` value into one override set; later
/// values win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::DefaultFilter => overrides.default_filter = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
