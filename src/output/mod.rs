//! Output encoders: human text, XML for LLM callers, JSON for scripts.
//!
//! One principle across all three: escape at the boundary, never inside
//! data. Errors use the same single-message envelope in every format.

pub mod json;
pub mod text;
pub mod xml;

use tokio::io::AsyncWriteExt;

/// The three interchangeable presentation formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Xml,
    Json,
}

impl OutputFormat {
    /// `--xml` wins over `--json`; neither means text.
    pub fn from_flags(xml: bool, json: bool) -> Self {
        if xml {
            OutputFormat::Xml
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Render the error envelope for a format. Text goes to stderr by the
/// caller; XML/JSON envelopes are documents of their own.
pub fn render_error(format: OutputFormat, message: &str) -> String {
    match format {
        OutputFormat::Text => format!("error: {message}"),
        OutputFormat::Json => json::error(message),
        OutputFormat::Xml => {
            let mut doc = xml::XmlDoc::new("result");
            doc.attr_on_root("status", "error");
            doc.leaf_cdata("error", message);
            doc.finish()
        }
    }
}

/// Write a (possibly large) document to stdout and wait for the drain so
/// piped consumers always see complete output.
pub async fn write_stdout(payload: &str) -> std::io::Result<()> {
    let mut out = tokio::io::stdout();
    out.write_all(payload.as_bytes()).await?;
    if !payload.ends_with('\n') {
        out.write_all(b"\n").await?;
    }
    out.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_selection() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Text);
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Xml);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Json);
    }

    #[test]
    fn error_envelopes() {
        assert_eq!(render_error(OutputFormat::Text, "boom"), "error: boom");
        assert!(render_error(OutputFormat::Json, "boom").contains("\"status\": \"error\""));
        let xml = render_error(OutputFormat::Xml, "boom & bust");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("status=\"error\""));
    }
}
