// src/pipeline.rs
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{info, warn};

use crate::{
    config::Config,
    fetch::{HttpSource, PageSource, Retrying},
    spell::Resolver,
    table::{Table, NAME_COLUMN},
};

/// Rows shown in the before/after previews.
const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub rows: usize,
    pub found: usize,
    pub not_found: usize,
}

/// Resolve every row's `SpellID` in order and write the result into `FullSpellName`.
/// Duplicate ids are fetched again; nothing is cached.
pub fn enrich<S: PageSource>(table: &mut Table, resolver: &Resolver<S>) -> Result<Summary> {
    let ids = table.spell_ids()?;
    let mut summary = Summary {
        rows: ids.len(),
        ..Summary::default()
    };

    let mut names = Vec::with_capacity(ids.len());
    for raw in &ids {
        let resolution = resolver.resolve(raw);
        if resolution.is_found() {
            summary.found += 1;
        } else {
            summary.not_found += 1;
        }
        names.push(resolution.into_display_name());
    }

    table.set_column(NAME_COLUMN, names)?;
    Ok(summary)
}

/// Load `config.input`, enrich it against the live site, save to `config.output`.
pub fn run(config: &Config) -> Result<Summary> {
    let http = HttpSource::new(config.timeout)?;
    let source = Retrying::new(http, config.max_retries, config.retry_backoff);
    let resolver = Resolver::new(source, config.base_url.clone())?;
    run_with(config, &resolver)
}

/// Same as [`run`] but against any page source.
#[tracing::instrument(level = "info", skip_all, fields(input = %config.input.display(), output = %config.output.display()))]
pub fn run_with<S: PageSource>(config: &Config, resolver: &Resolver<S>) -> Result<Summary> {
    let start = Instant::now();

    let mut table = Table::load(&config.input, config.delimiter)?;
    info!(rows = table.len(), "loaded table\n{}", table.preview(PREVIEW_ROWS));
    if table.is_empty() {
        warn!("input table has no rows; writing header only");
    }

    let summary = enrich(&mut table, resolver)
        .with_context(|| format!("enriching {:?}", config.input))?;
    info!("enriched table\n{}", table.preview(PREVIEW_ROWS));

    table.save(&config.output, config.delimiter)?;
    info!(
        rows = summary.rows,
        found = summary.found,
        not_found = summary.not_found,
        elapsed = ?start.elapsed(),
        "CSV has been saved to {}",
        config.output.display()
    );

    Ok(summary)
}
