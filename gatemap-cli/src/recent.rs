//! `recent` command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::services::Services;
use crate::{ARG_RECENTS_DB, CliError, DEFAULT_RECENTS_DB, write_line};

/// CLI arguments for the `recent` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print the recently chosen places, oldest first, one \
                 `place-id<TAB>description` line each. With --clear the \
                 history is emptied instead.",
    about = "List or clear recent places"
)]
#[ortho_config(prefix = "GATEMAP")]
pub(crate) struct RecentArgs {
    /// Path to the recent-places database.
    #[arg(long = ARG_RECENTS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) recents_db: Option<Utf8PathBuf>,
    /// Forget every recent place.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) clear: bool,
}

pub(crate) fn run_recent(
    args: RecentArgs,
    services: &dyn Services,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let path = merged
        .recents_db
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_RECENTS_DB));
    let store = services.recents(&path)?;

    if merged.clear {
        store.clear()?;
        info!("cleared recent places at {path}");
        return Ok(());
    }
    for entry in store.list()? {
        write_line(
            writer,
            &format!("{}\t{}", entry.place_id(), entry.description()),
        )?;
    }
    Ok(())
}
