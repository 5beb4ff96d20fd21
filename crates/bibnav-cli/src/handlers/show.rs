use anyhow::Result;

use crate::context::ExecutionContext;

pub fn handle(ctx: &ExecutionContext, label: &str) -> Result<()> {
    let store = ctx.open_store()?;
    print!("{}", store.show(label)?);
    Ok(())
}
