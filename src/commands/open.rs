//! `open`: jump to a change in the browser.

use gerrit_api::ident::format_change_url;

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output;

pub async fn run(ctx: &Context, change: Option<String>) -> CliResult<i32> {
    let resolved = ctx.resolve_change(change.as_deref())?;
    let info = ctx.client.get_change(&resolved.id, &[]).await?;
    let url = format_change_url(ctx.client.host(), &info.project, info.number);
    open::that(&url).map_err(|e| CliError::Validation(format!("cannot open browser: {e}")))?;
    output::write_stdout(&url).await?;
    Ok(EXIT_OK)
}
