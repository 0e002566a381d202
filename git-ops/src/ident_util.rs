//! Remote-URL hostname extraction.
//!
//! Understands plain hostnames, http(s)/ssh URLs and the scp-like
//! `user@host:path` form git accepts for SSH remotes.

/// Hostname of a remote URL or host string, lowercased. `None` when the
/// input has no recognizable host part.
pub fn host_of_remote_url(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    // URL form: scheme://[user@]host[:port]/...
    if let Some(rest) = s.split_once("://").map(|(_, r)| r) {
        let authority = rest.split(['/', '?', '#']).next()?;
        let host = authority.rsplit('@').next()?;
        let host = host.split(':').next()?;
        return (!host.is_empty()).then(|| host.to_ascii_lowercase());
    }

    // scp-like form: [user@]host:path (no scheme, a colon before any slash).
    if let Some((authority, _path)) = s.split_once(':') {
        if !authority.contains('/') {
            let host = authority.rsplit('@').next()?;
            return (!host.is_empty()).then(|| host.to_ascii_lowercase());
        }
    }

    // Bare hostname, possibly with a path.
    let host = s.split(['/', ':']).next()?;
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::host_of_remote_url;

    #[test]
    fn url_forms() {
        assert_eq!(
            host_of_remote_url("https://gerrit.example.com/a/proj").as_deref(),
            Some("gerrit.example.com")
        );
        assert_eq!(
            host_of_remote_url("ssh://alice@gerrit.example.com:29418/proj").as_deref(),
            Some("gerrit.example.com")
        );
    }

    #[test]
    fn scp_like_form() {
        assert_eq!(
            host_of_remote_url("git@Gerrit.Example.com:proj.git").as_deref(),
            Some("gerrit.example.com")
        );
    }

    #[test]
    fn bare_host() {
        assert_eq!(
            host_of_remote_url("gerrit.example.com").as_deref(),
            Some("gerrit.example.com")
        );
        assert_eq!(host_of_remote_url(""), None);
    }
}
