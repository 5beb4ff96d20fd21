use anyhow::Result;
use bibnav_runtime::ListArgs;

use crate::context::ExecutionContext;

pub fn handle(
    ctx: &ExecutionContext,
    query: &str,
    context: Option<usize>,
    args: &[String],
) -> Result<()> {
    let store = ctx.open_store()?;
    let (rows, hits) = store.search(query, context, &ListArgs::parse(args)?)?;

    if hits == 0 {
        println!("No search hits for '{}'!", query);
        return Ok(());
    }
    for row in rows {
        println!("{}", row);
    }
    Ok(())
}
