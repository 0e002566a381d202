//! `setup`: interactive first-run configuration.
//!
//! Prompts for host, username and HTTP password, probes authentication,
//! and persists the config file only after the probe succeeds.

use std::io::{BufRead, Write};

use gerrit_api::GerritClient;
use gerrit_api::ident::normalize_host;

use crate::commands::EXIT_OK;
use crate::config::{self, Credentials};
use crate::error::{CliError, CliResult};
use crate::output;

fn ask(question: &str) -> CliResult<String> {
    print!("{question}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub async fn run() -> CliResult<i32> {
    let host = ask("Gerrit host (e.g. https://gerrit.example.com): ")?;
    if host.is_empty() {
        return Err(CliError::Validation("host must not be empty".to_string()));
    }
    let username = ask("Username: ")?;
    if username.is_empty() {
        return Err(CliError::Validation("username must not be empty".to_string()));
    }
    let password = ask("HTTP password (from Gerrit settings): ")?;
    if password.is_empty() {
        return Err(CliError::Validation("password must not be empty".to_string()));
    }
    let ai_tool = ask("Preferred AI review tool (empty for auto-detect): ")?;

    let creds = Credentials {
        host: normalize_host(&host),
        username,
        password,
        ai_tool: (!ai_tool.is_empty()).then_some(ai_tool),
        ai_auto_detect: true,
    };

    // Probe before persisting so a typo doesn't land in the config file.
    let client = GerritClient::new(&creds.host, &creds.username, &creds.password)?;
    let account = client.get_self_account().await?;

    let path = config::store(&creds)?;
    output::write_stdout(&format!(
        "authenticated as {}\nconfiguration written to {}",
        account.display(),
        path.display()
    ))
    .await?;
    Ok(EXIT_OK)
}
