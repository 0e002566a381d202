//! Minimal XML document builder.
//!
//! Element text is either entity-escaped or CDATA-wrapped; CDATA content
//! neutralizes `]]>` before emission so a hostile comment can never close
//! the section early. Absent optional values are omitted entirely. Every
//! document starts with the UTF-8 declaration.

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Escape text for use in element content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Neutralize CDATA closure inside free-form text.
pub fn cdata_escape(s: &str) -> String {
    s.replace("]]>", "]]&gt;")
}

/// Streaming document builder with two-space indentation.
#[derive(Debug)]
pub struct XmlDoc {
    buf: String,
    stack: Vec<String>,
    root_attrs: Vec<(String, String)>,
    root_open: bool,
}

impl XmlDoc {
    /// Start a document with the given root element.
    pub fn new(root: &str) -> Self {
        Self {
            buf: String::new(),
            stack: vec![root.to_string()],
            root_attrs: Vec::new(),
            root_open: false,
        }
    }

    /// Attach an attribute to the root element. Only valid before the first
    /// child is written.
    pub fn attr_on_root(&mut self, key: &str, value: &str) {
        debug_assert!(!self.root_open);
        self.root_attrs.push((key.to_string(), value.to_string()));
    }

    fn ensure_root(&mut self) {
        if self.root_open {
            return;
        }
        self.root_open = true;
        self.buf.push_str(XML_DECL);
        self.buf.push('\n');
        self.buf.push('<');
        self.buf.push_str(&self.stack[0].clone());
        for (k, v) in std::mem::take(&mut self.root_attrs) {
            self.buf.push(' ');
            self.buf.push_str(&k);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape(&v));
            self.buf.push('"');
        }
        self.buf.push_str(">\n");
    }

    fn indent(&mut self) {
        for _ in 0..self.stack.len() {
            self.buf.push_str("  ");
        }
    }

    /// Open a nested element.
    pub fn open(&mut self, name: &str) {
        self.ensure_root();
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        self.buf.push_str(">\n");
        self.stack.push(name.to_string());
    }

    /// Open a nested element with attributes.
    pub fn open_attrs(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.ensure_root();
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        for (k, v) in attrs {
            self.buf.push(' ');
            self.buf.push_str(k);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape(v));
            self.buf.push('"');
        }
        self.buf.push_str(">\n");
        self.stack.push(name.to_string());
    }

    /// Close the innermost open element.
    pub fn close(&mut self) {
        debug_assert!(self.stack.len() > 1, "close() would pop the root");
        let name = self.stack.pop().unwrap_or_default();
        self.indent();
        self.buf.push_str("</");
        self.buf.push_str(&name);
        self.buf.push_str(">\n");
    }

    /// `<name>escaped text</name>`.
    pub fn leaf(&mut self, name: &str, value: &str) {
        self.ensure_root();
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        self.buf.push('>');
        self.buf.push_str(&escape(value));
        self.buf.push_str("</");
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    /// `<name><![CDATA[...]]></name>` for free-form text.
    pub fn leaf_cdata(&mut self, name: &str, value: &str) {
        self.ensure_root();
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        self.buf.push_str("><![CDATA[");
        self.buf.push_str(&cdata_escape(value));
        self.buf.push_str("]]></");
        self.buf.push_str(name);
        self.buf.push_str(">\n");
    }

    /// Emit the leaf only when a value is present.
    pub fn leaf_opt(&mut self, name: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.leaf(name, v);
        }
    }

    /// `<name/>` — used when emptiness itself is meaningful (a cleared
    /// topic), never as a default for absent data.
    pub fn empty(&mut self, name: &str) {
        self.ensure_root();
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        self.buf.push_str("/>\n");
    }

    /// Close all remaining elements and return the document.
    pub fn finish(mut self) -> String {
        self.ensure_root();
        while self.stack.len() > 1 {
            self.close();
        }
        let root = self.stack.pop().unwrap_or_default();
        self.buf.push_str("</");
        self.buf.push_str(&root);
        self.buf.push_str(">\n");
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_and_nesting() {
        let mut doc = XmlDoc::new("result");
        doc.open("change");
        doc.leaf("subject", "a < b & c");
        doc.close();
        let out = doc.finish();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<result>"));
        assert!(out.contains("<subject>a &lt; b &amp; c</subject>"));
        assert!(out.ends_with("</result>\n"));
    }

    #[test]
    fn attribute_escaping() {
        let mut doc = XmlDoc::new("result");
        doc.open_attrs("item", &[("name", "a\"b'c<d")]);
        doc.close();
        let out = doc.finish();
        assert!(out.contains("name=\"a&quot;b&apos;c&lt;d\""));
    }

    #[test]
    fn cdata_closure_is_neutralized() {
        let mut doc = XmlDoc::new("result");
        doc.leaf_cdata("message", "evil ]]><script>alert(1)</script>");
        let out = doc.finish();
        // The raw closer must never appear inside the CDATA body.
        let body = out
            .split("<![CDATA[")
            .nth(1)
            .and_then(|s| s.split("]]></message>").next())
            .unwrap();
        assert!(!body.contains("]]>"));
        assert!(body.contains("]]&gt;"));
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let mut doc = XmlDoc::new("result");
        doc.leaf_opt("topic", None);
        doc.leaf_opt("branch", Some("main"));
        let out = doc.finish();
        assert!(!out.contains("<topic"));
        assert!(out.contains("<branch>main</branch>"));
    }

    #[test]
    fn finish_closes_open_elements() {
        let mut doc = XmlDoc::new("result");
        doc.open("a");
        doc.open("b");
        let out = doc.finish();
        assert!(out.contains("</b>"));
        assert!(out.contains("</a>"));
        assert!(out.ends_with("</result>\n"));
    }
}
