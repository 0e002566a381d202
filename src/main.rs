use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod error;
mod output;
mod resolver;

use cli::{Cli, Command};
use commands::Context;
use error::CliResult;
use output::OutputFormat;

#[tokio::main]
async fn main() {
    // .env is optional; real environments set variables directly.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();
    // Logs go to stderr so stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.command.format();

    let code = match dispatch(cli.command, format).await {
        Ok(code) => code,
        Err(e) => {
            // Errors are lowered exactly once, here, at the boundary.
            let message = e.to_string();
            match format {
                OutputFormat::Text => eprintln!("{}", output::render_error(format, &message)),
                _ => println!("{}", output::render_error(format, &message)),
            }
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn dispatch(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Setup => commands::setup::run().await,

        Command::Status { .. } => {
            let ctx = Context::load(format)?;
            commands::status::run(&ctx).await
        }
        Command::Mine { .. } => {
            let ctx = Context::load(format)?;
            commands::search::run_mine(&ctx).await
        }
        Command::Incoming { ignore_wip, .. } => {
            let ctx = Context::load(format)?;
            commands::search::run_incoming(&ctx, ignore_wip).await
        }
        Command::Search { query, limit, .. } => {
            let ctx = Context::load(format)?;
            commands::search::run_search(&ctx, query, limit).await
        }
        Command::Show { change, .. } => {
            let ctx = Context::load(format)?;
            commands::show::run(&ctx, change).await
        }
        Command::Diff {
            change,
            file,
            files_only,
            format: diff_format,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::diff::run(&ctx, change, file, files_only, diff_format).await
        }
        Command::Comments { change, .. } => {
            let ctx = Context::load(format)?;
            commands::comments::run_list(&ctx, change).await
        }
        Command::Comment {
            change,
            message,
            file,
            line,
            unresolved,
            batch,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::comments::run_post(&ctx, change, message, file, line, unresolved, batch)
                .await
        }
        Command::AddReviewer {
            principals,
            change,
            cc,
            group,
            notify,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::reviewers::run_add(&ctx, principals, change, cc, group, notify).await
        }
        Command::RemoveReviewer {
            principals,
            change,
            notify,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::reviewers::run_remove(&ctx, principals, change, notify).await
        }
        Command::Vote {
            change,
            code_review,
            verified,
            label,
            message,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::vote::run(&ctx, change, code_review, verified, label, message).await
        }
        Command::Submit { change, .. } => {
            let ctx = Context::load(format)?;
            commands::lifecycle::run_submit(&ctx, change).await
        }
        Command::Abandon { change, message, .. } => {
            let ctx = Context::load(format)?;
            commands::lifecycle::run_abandon(&ctx, change, message).await
        }
        Command::Restore { change, message, .. } => {
            let ctx = Context::load(format)?;
            commands::lifecycle::run_restore(&ctx, change, message).await
        }
        Command::Rebase { change, base, .. } => {
            let ctx = Context::load(format)?;
            commands::lifecycle::run_rebase(&ctx, change, base).await
        }
        Command::Topic {
            change,
            topic,
            delete,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::topic::run(&ctx, change, topic, delete).await
        }
        Command::Projects { pattern, .. } => {
            let ctx = Context::load(format)?;
            commands::directory::run_projects(&ctx, pattern).await
        }
        Command::Groups {
            pattern,
            owned,
            project,
            user,
            limit,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::directory::run_groups(&ctx, pattern, owned, project, user, limit).await
        }
        Command::GroupsShow { group, .. } => {
            let ctx = Context::load(format)?;
            commands::directory::run_groups_show(&ctx, group).await
        }
        Command::GroupsMembers { group, .. } => {
            let ctx = Context::load(format)?;
            commands::directory::run_groups_members(&ctx, group).await
        }
        Command::ExtractUrl {
            pattern,
            change,
            include_comments,
            regex,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::extract_url::run(&ctx, pattern, change, include_comments, regex).await
        }
        Command::BuildStatus {
            change,
            watch,
            interval,
            timeout,
            exit_status,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::build_status::run(&ctx, change, watch, interval, timeout, exit_status)
                .await
        }
        Command::Push {
            branch,
            topic,
            reviewers,
            ccs,
            wip,
            ready,
            private,
            hashtags,
            dry_run,
            remote,
            ..
        } => {
            let ctx = Context::load(format)?;
            let opts = commands::push::PushOptions {
                topic,
                reviewers,
                ccs,
                wip,
                ready,
                private,
                hashtags,
            };
            commands::push::run(&ctx, branch, opts, remote, dry_run).await
        }
        Command::Checkout {
            change,
            detach,
            remote,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::checkout::run(&ctx, change, detach, remote).await
        }
        Command::Review {
            change,
            comment,
            yes,
            debug,
            prompt,
            tool,
            system_prompt,
            ..
        } => {
            let ctx = Context::load(format)?;
            commands::review::run(&ctx, change, comment, yes, debug, prompt, tool, system_prompt)
                .await
        }
        Command::Open { change } => {
            let ctx = Context::load(format)?;
            commands::open::run(&ctx, change).await
        }
    }
}
