//! Change identifier classification and review-URL parsing.
//!
//! Everything here is a pure function over strings; no I/O. The resolver and
//! the command layer build on these to turn whatever the user typed into a
//! canonical change reference.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"^\d+$").unwrap();
    static ref CHANGE_ID_RE: Regex = Regex::new(r"^I[0-9a-f]{40}$").unwrap();
    /// Path-routed, hash-routed and simplified review URL forms:
    /// `/c/<project>/+/<n>(/<ps>)?`, `/#/c/<project>/+/<n>`, `/c/+/<n>`.
    static ref REVIEW_URL_RE: Regex = Regex::new(
        r"^https?://[^/]+(?:/[^#?]*)?/(?:#/)?c/(?:[^#?]+/)?\+/(\d+)(?:/(\d+))?/?(?:[#?].*)?$"
    )
    .unwrap();
    static ref CHANGE_ID_FOOTER_RE: Regex =
        Regex::new(r"(?m)^(?i:change-id):[ \t]*(I[0-9a-f]{40})[ \t\r]*$").unwrap();
}

/// Classification of a user-supplied change reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRef {
    /// Numeric change number, strictly positive.
    Number(u32),
    /// Full `I` + 40 lowercase hex Change-Id.
    ChangeId(String),
    Invalid,
}

impl ChangeRef {
    /// Identifier string usable in REST paths.
    pub fn as_rest_id(&self) -> Option<String> {
        match self {
            ChangeRef::Number(n) => Some(n.to_string()),
            ChangeRef::ChangeId(id) => Some(id.clone()),
            ChangeRef::Invalid => None,
        }
    }
}

impl std::fmt::Display for ChangeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeRef::Number(n) => write!(f, "{n}"),
            ChangeRef::ChangeId(id) => write!(f, "{id}"),
            ChangeRef::Invalid => write!(f, "<invalid>"),
        }
    }
}

/// Classify a raw string as a change number, a Change-Id, or neither.
///
/// Rules, in order: trim; empty → Invalid; all-digits and positive → Number;
/// `I` + 40 lowercase hex → ChangeId; anything else → Invalid.
pub fn classify(raw: &str) -> ChangeRef {
    let s = raw.trim();
    if s.is_empty() {
        return ChangeRef::Invalid;
    }
    if NUMBER_RE.is_match(s) {
        return match s.parse::<u32>() {
            Ok(n) if n > 0 => ChangeRef::Number(n),
            _ => ChangeRef::Invalid,
        };
    }
    if CHANGE_ID_RE.is_match(s) {
        return ChangeRef::ChangeId(s.to_string());
    }
    ChangeRef::Invalid
}

/// Canonical rendering of a valid reference (leading zeros dropped from
/// numbers). Returns `None` for invalid input. Idempotent by construction.
pub fn canonicalize(raw: &str) -> Option<String> {
    match classify(raw) {
        ChangeRef::Number(n) => Some(n.to_string()),
        ChangeRef::ChangeId(id) => Some(id),
        ChangeRef::Invalid => None,
    }
}

/// Change number and optional patchset extracted from a review URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlChange {
    pub number: u32,
    pub patchset: Option<u32>,
}

/// Extract a change number (and optional patchset) from a Gerrit review URL.
///
/// Returns `None` when the input is not a recognizable review URL; callers
/// then fall back to plain classification of the original string.
pub fn parse_review_url(input: &str) -> Option<UrlChange> {
    let caps = REVIEW_URL_RE.captures(input.trim())?;
    let number: u32 = caps.get(1)?.as_str().parse().ok()?;
    if number == 0 {
        return None;
    }
    let patchset = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
    Some(UrlChange { number, patchset })
}

/// `NNN/M` shorthand used by `checkout`: change number plus patchset.
pub fn parse_change_patchset_shorthand(input: &str) -> Option<UrlChange> {
    let (num, ps) = input.trim().split_once('/')?;
    let number: u32 = num.parse().ok()?;
    let patchset: u32 = ps.parse().ok()?;
    if number == 0 || patchset == 0 {
        return None;
    }
    Some(UrlChange {
        number,
        patchset: Some(patchset),
    })
}

/// Normalize a Gerrit host: require a scheme (default https), strip one
/// trailing slash, keep any embedded path.
pub fn normalize_host(raw: &str) -> String {
    let s = raw.trim();
    let with_scheme = if s.starts_with("http://") || s.starts_with("https://") {
        s.to_string()
    } else {
        format!("https://{s}")
    };
    with_scheme
        .strip_suffix('/')
        .map(str::to_string)
        .unwrap_or(with_scheme)
}

/// Extract the `Change-Id` trailer from a commit message.
///
/// First match wins; the key is matched case-insensitively and CRLF line
/// endings are tolerated. Inline occurrences (not at start of line) are
/// ignored.
pub fn change_id_from_commit_message(message: &str) -> Option<String> {
    CHANGE_ID_FOOTER_RE
        .captures(message)
        .map(|c| c[1].to_string())
}

/// Web URL for a change, matching Gerrit's canonical `/c/<project>/+/<n>`.
pub fn format_change_url(host: &str, project: &str, number: u32) -> String {
    format!("{}/c/{}/+/{}", normalize_host(host), project, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_number() {
        assert_eq!(classify("392385"), ChangeRef::Number(392385));
        assert_eq!(classify("  42 "), ChangeRef::Number(42));
        assert_eq!(classify("007"), ChangeRef::Number(7));
        assert_eq!(classify("0"), ChangeRef::Invalid);
        assert_eq!(classify(""), ChangeRef::Invalid);
        assert_eq!(classify("99999999999999999999"), ChangeRef::Invalid);
    }

    #[test]
    fn classify_change_id() {
        let id = format!("I{}", "0123456789abcdef".repeat(3).get(..40).unwrap());
        assert_eq!(classify(&id), ChangeRef::ChangeId(id.clone()));
        // Uppercase hex is rejected; Change-Ids are validated case-sensitively.
        assert_eq!(classify(&id.to_uppercase()), ChangeRef::Invalid);
        assert_eq!(classify("Iabc"), ChangeRef::Invalid);
    }

    #[test]
    fn canonicalize_is_idempotent() {
        for raw in ["  42", "007", "Ideadbeefdeadbeefdeadbeefdeadbeefdeadbeef", "junk"] {
            if let Some(canon) = canonicalize(raw) {
                assert_eq!(canonicalize(&canon).as_deref(), Some(canon.as_str()));
            }
        }
    }

    #[test]
    fn parse_url_forms() {
        let u = parse_review_url("https://g.example/c/proj/+/12345/3").unwrap();
        assert_eq!(u.number, 12345);
        assert_eq!(u.patchset, Some(3));

        let u = parse_review_url("http://g.example/c/some/nested/proj/+/9").unwrap();
        assert_eq!(u.number, 9);
        assert_eq!(u.patchset, None);

        // Hash-routed and simplified forms.
        assert_eq!(
            parse_review_url("https://g.example/#/c/proj/+/77").map(|u| u.number),
            Some(77)
        );
        assert_eq!(
            parse_review_url("https://g.example/c/+/31415").map(|u| u.number),
            Some(31415)
        );
        // Embedded server path before /c/.
        assert_eq!(
            parse_review_url("https://g.example/gerrit/c/proj/+/8").map(|u| u.number),
            Some(8)
        );
    }

    #[test]
    fn parse_url_rejects_junk() {
        assert!(parse_review_url("not a url").is_none());
        assert!(parse_review_url("https://g.example/x/12345").is_none());
        assert!(parse_review_url("ftp://g.example/c/p/+/1").is_none());
    }

    #[test]
    fn url_round_trip() {
        let url = format_change_url("g.example", "proj", 4242);
        assert_eq!(parse_review_url(&url).map(|u| u.number), Some(4242));
    }

    #[test]
    fn shorthand() {
        let u = parse_change_patchset_shorthand("123/4").unwrap();
        assert_eq!((u.number, u.patchset), (123, Some(4)));
        assert!(parse_change_patchset_shorthand("123").is_none());
        assert!(parse_change_patchset_shorthand("0/1").is_none());
    }

    #[test]
    fn host_normalization() {
        assert_eq!(normalize_host("g.example"), "https://g.example");
        assert_eq!(normalize_host("https://g.example/"), "https://g.example");
        assert_eq!(
            normalize_host("http://g.example/gerrit/"),
            "http://g.example/gerrit"
        );
    }

    #[test]
    fn footer_extraction() {
        let id = "Ideadbeefdeadbeefdeadbeefdeadbeefdeadbeef";
        let msg = format!("subject\n\nbody text\n\nChange-Id: {id}\n");
        assert_eq!(change_id_from_commit_message(&msg).as_deref(), Some(id));

        // CRLF and case-insensitive key.
        let msg = format!("subject\r\n\r\nchange-id: {id}\r\n");
        assert_eq!(change_id_from_commit_message(&msg).as_deref(), Some(id));

        // Inline mention is not a footer.
        let msg = format!("subject mentions Change-Id: {id} inline\nbody\n");
        assert_eq!(change_id_from_commit_message(&msg), None);

        // First footer wins.
        let other = "I0000000000000000000000000000000000000000";
        let msg = format!("s\n\nChange-Id: {other}\nChange-Id: {id}\n");
        assert_eq!(change_id_from_commit_message(&msg).as_deref(), Some(other));
    }

    #[test]
    fn footer_compose_round_trip() {
        let id = "Iffffffffffffffffffffffffffffffffffffffff";
        let msg = format!("feat: thing\n\nlong body\n\nChange-Id: {id}");
        assert_eq!(change_id_from_commit_message(&msg).as_deref(), Some(id));
    }
}
