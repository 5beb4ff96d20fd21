use anyhow::{Result, bail};
use bibnav_runtime::{Config, RecordStore, StoreOptions};
use tracing::info;

use crate::context::ExecutionContext;

/// Write the default configuration and create an empty record file when
/// none exists yet.
pub fn handle(ctx: &ExecutionContext, force: bool) -> Result<()> {
    let config_path = ctx.config_path();
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    Config::default().save_to(config_path)?;
    println!("Wrote configuration to {}", config_path.display());

    let database = ctx.database_path()?;
    if database.exists() {
        println!("Using existing records at {}", database.display());
    } else {
        RecordStore::open(&database, StoreOptions::default())?.save()?;
        println!("Created empty record file at {}", database.display());
    }

    info!(config = %config_path.display(), database = %database.display(), "initialized");
    Ok(())
}
