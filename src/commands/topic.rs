//! `topic`: read, set or clear a change's topic.

use serde_json::json;

use crate::commands::{Context, EXIT_OK};
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat, json, xml::XmlDoc};

pub async fn run(
    ctx: &Context,
    change: Option<String>,
    topic: Option<String>,
    delete: bool,
) -> CliResult<i32> {
    if delete && topic.is_some() {
        return Err(CliError::Validation(
            "--delete cannot be combined with a new topic".to_string(),
        ));
    }
    let resolved = ctx.resolve_change(change.as_deref())?;

    // A cleared topic is semantically different from an absent one; the XML
    // encoder keeps `<topic/>` for the cleared case.
    let (action, value): (&str, Option<String>) = if delete {
        ctx.client.delete_topic(&resolved.id).await?;
        ("deleted", None)
    } else if let Some(new_topic) = topic {
        let stored = ctx.client.set_topic(&resolved.id, &new_topic).await?;
        ("set", Some(stored))
    } else {
        let current = ctx.client.get_topic(&resolved.id).await?;
        ("current", (!current.is_empty()).then_some(current))
    };

    let rendered = match ctx.format {
        OutputFormat::Text => match (&value, action) {
            (Some(t), "set") => format!("topic set to {t}"),
            (Some(t), _) => t.clone(),
            (None, "deleted") => "topic deleted".to_string(),
            (None, _) => "no topic".to_string(),
        },
        OutputFormat::Json => json::success_with(
            "topic",
            json!({ "action": action, "value": value }),
        ),
        OutputFormat::Xml => {
            let mut doc = XmlDoc::new("result");
            doc.attr_on_root("status", "success");
            doc.leaf("action", action);
            match &value {
                Some(t) => doc.leaf("topic", t),
                None => doc.empty("topic"),
            }
            doc.finish()
        }
    };
    output::write_stdout(&rendered).await?;
    Ok(EXIT_OK)
}
