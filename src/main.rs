use anyhow::Result;
use spellnames::{pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        base_url = %config.base_url,
        "configured"
    );

    // ─── 3) load → resolve names → save ──────────────────────────────
    let summary = pipeline::run(&config)?;
    info!(
        rows = summary.rows,
        found = summary.found,
        not_found = summary.not_found,
        "all done"
    );
    Ok(())
}
