use anyhow::Result;
use bibnav_runtime::ListArgs;

use crate::context::ExecutionContext;

/// Print the list rows. Without arguments the configured default list
/// arguments apply.
pub fn handle(ctx: &ExecutionContext, args: &[String]) -> Result<()> {
    let store = ctx.open_store()?;
    let args = if args.is_empty() {
        ListArgs::parse(ctx.config()?.tui.default_list_args.as_slice())?
    } else {
        ListArgs::parse(args)?
    };

    for (_, row) in store.list_rows(&args) {
        println!("{}", row);
    }
    Ok(())
}
