//! Layered CLI settings: variant preset, then the TOML file, then flags.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use percent_maze_core::{SessionConfig, Variant};
use serde::Deserialize;

use crate::Args;

/// Store document used when neither the file nor the flags name one.
const DEFAULT_STORE: &str = "percent-maze-store.json";

/// Fully resolved settings for one CLI run.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) variant: Variant,
    pub(crate) seed: u64,
    pub(crate) store: PathBuf,
    pub(crate) config: SessionConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    variant: Option<Variant>,
    seed: Option<u64>,
    store: Option<PathBuf>,
    session: toml::Table,
}

/// Resolves the settings for this run from the optional config file and the flags.
pub(crate) fn load(args: &Args) -> Result<Settings> {
    let file = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => FileSettings::default(),
    };

    let variant = args.variant.or(file.variant).unwrap_or(Variant::Game);
    let mut config = merge_session(variant.config(), file.session)?;
    if let Some(grid_size) = args.grid_size {
        config.grid_size = grid_size;
    }

    Ok(Settings {
        variant,
        seed: args.seed.or(file.seed).unwrap_or_else(rand::random),
        store: args
            .store
            .clone()
            .or(file.store)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE)),
        config,
    })
}

fn parse(contents: &str) -> Result<FileSettings> {
    toml::from_str(contents).context("invalid settings toml")
}

/// Overlays the keys of a `[session]` table onto a variant's preset.
fn merge_session(base: SessionConfig, overrides: toml::Table) -> Result<SessionConfig> {
    if overrides.is_empty() {
        return Ok(base);
    }

    let mut value = toml::Value::try_from(base).context("failed to encode variant preset")?;
    if let toml::Value::Table(table) = &mut value {
        for (key, override_value) in overrides {
            let _ = table.insert(key, override_value);
        }
    }
    value.try_into().context("invalid [session] table")
}
