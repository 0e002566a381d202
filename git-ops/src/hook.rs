//! commit-msg hook provisioning.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Error, GitResult};

/// Location of the commit-msg hook inside a `.git` directory.
pub fn commit_msg_hook_path(git_dir: &Path) -> PathBuf {
    git_dir.join("hooks").join("commit-msg")
}

/// Is a commit-msg hook already installed?
pub fn is_hook_installed(git_dir: &Path) -> bool {
    commit_msg_hook_path(git_dir).is_file()
}

/// Install the commit-msg hook script, executable, idempotently.
///
/// The content must begin with `#!`; anything else (an HTML error page, an
/// empty body) is rejected before touching disk.
pub fn install_commit_msg_hook(git_dir: &Path, content: &str) -> GitResult<PathBuf> {
    if !content.starts_with("#!") {
        return Err(Error::InvalidInput(
            "commit-msg hook does not start with a shebang".to_string(),
        ));
    }
    let path = commit_msg_hook_path(git_dir);
    if path.is_file() {
        debug!("hook: commit-msg already installed at {}", path.display());
        return Ok(path);
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    debug!("hook: installed commit-msg at {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn installs_executable_hook_once() {
        let dir = TempDir::new().unwrap();
        let git_dir = dir.path();
        let path = install_commit_msg_hook(git_dir, "#!/bin/sh\nexit 0\n").unwrap();
        assert!(path.is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o755, 0o755);
        }

        // Second install is a no-op that keeps the existing content.
        fs::write(&path, "#!/bin/sh\nexit 1\n").unwrap();
        install_commit_msg_hook(git_dir, "#!/bin/sh\nexit 0\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/sh\nexit 1\n");
    }

    #[test]
    fn rejects_non_script_content() {
        let dir = TempDir::new().unwrap();
        let err = install_commit_msg_hook(dir.path(), "<html>error</html>").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!is_hook_installed(dir.path()));
    }
}
