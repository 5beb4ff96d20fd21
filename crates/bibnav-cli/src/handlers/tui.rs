use anyhow::Result;
use bibnav_engine::Dispatcher;
use tracing::info;

use crate::context::ExecutionContext;
use crate::tui::{self, Palette};

pub fn handle(ctx: &ExecutionContext) -> Result<()> {
    let config = ctx.config()?;
    let store = ctx.open_store()?;
    info!(path = %store.path().display(), records = store.len(), "starting tui");

    let mut dispatcher = Dispatcher::new(store, config.key_table()?, config.settings())
        .with_keymap(config.key_map()?);
    tui::run(&mut dispatcher, Palette::from_config(config))
}
