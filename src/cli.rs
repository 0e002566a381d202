//! Command-line surface.

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "gerrit",
    version,
    about = "Command-line client for Gerrit code review",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// `--xml` / `--json` shared by every informational command.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct FormatArgs {
    /// Emit XML (for LLM callers)
    #[arg(long)]
    pub xml: bool,
    /// Emit JSON (for scripts)
    #[arg(long)]
    pub json: bool,
}

impl FormatArgs {
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_flags(self.xml, self.json)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive first-time setup: host, username, HTTP password
    #[command(alias = "init")]
    Setup,

    /// Connection status: configured host, auth probe, detected change
    Status {
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Open changes you own
    Mine {
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Open changes where you are a reviewer
    Incoming {
        /// Skip work-in-progress changes
        #[arg(short = 'i', long)]
        ignore_wip: bool,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Search changes with a Gerrit query
    Search {
        /// Gerrit query (default: is:open)
        query: Option<String>,
        /// Result limit (0 = server default)
        #[arg(short = 'n', long = "limit", default_value_t = 25)]
        limit: u32,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Show one change in full detail
    Show {
        /// Change number, Change-Id or URL (default: from HEAD)
        change: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Diff of the current patchset
    Diff {
        change: String,
        /// Restrict to one file
        #[arg(long)]
        file: Option<String>,
        /// List changed files only
        #[arg(long)]
        files_only: bool,
        /// unified | files
        #[arg(long, default_value = "unified")]
        format: String,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// List inline comments
    Comments {
        change: String,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Post a comment (overall, inline, or a batch from stdin)
    Comment {
        change: String,
        /// Comment text
        #[arg(short = 'm', long)]
        message: Option<String>,
        /// File path for an inline comment
        #[arg(long)]
        file: Option<String>,
        /// Line for an inline comment
        #[arg(long)]
        line: Option<u32>,
        /// Mark the comment unresolved
        #[arg(long)]
        unresolved: bool,
        /// Read a JSON array of inline comments from stdin
        #[arg(long)]
        batch: bool,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Add reviewers or CCs
    AddReviewer {
        /// Accounts or groups
        principals: Vec<String>,
        /// Change (default: from HEAD)
        #[arg(short = 'c', long)]
        change: Option<String>,
        /// Add as CC instead of reviewer
        #[arg(long)]
        cc: bool,
        /// Principals are group identifiers
        #[arg(long)]
        group: bool,
        /// NONE | OWNER | OWNER_REVIEWERS | ALL
        #[arg(long)]
        notify: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Remove reviewers
    RemoveReviewer {
        principals: Vec<String>,
        #[arg(short = 'c', long)]
        change: Option<String>,
        /// NONE | OWNER | OWNER_REVIEWERS | ALL
        #[arg(long)]
        notify: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Vote on labels
    Vote {
        change: String,
        /// Code-Review vote (-2..2)
        #[arg(long)]
        code_review: Option<i32>,
        /// Verified vote (-1..1)
        #[arg(long)]
        verified: Option<i32>,
        /// Custom label as NAME VALUE (repeatable)
        #[arg(long, num_args = 2, value_names = ["NAME", "VALUE"])]
        label: Vec<String>,
        /// Message posted with the votes
        #[arg(short = 'm', long)]
        message: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Submit a change
    Submit {
        change: String,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Abandon a change
    Abandon {
        change: String,
        #[arg(short = 'm', long)]
        message: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Restore an abandoned change
    Restore {
        change: String,
        #[arg(short = 'm', long)]
        message: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Rebase a change on its target branch (or an explicit base)
    Rebase {
        change: Option<String>,
        /// Base revision or change number
        #[arg(long)]
        base: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Read, set or delete the topic
    Topic {
        change: Option<String>,
        /// New topic (omit to read)
        topic: Option<String>,
        /// Clear the topic
        #[arg(long)]
        delete: bool,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// List projects
    Projects {
        /// Substring match
        #[arg(long)]
        pattern: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// List groups
    Groups {
        #[arg(long)]
        pattern: Option<String>,
        /// Only groups you own
        #[arg(long)]
        owned: bool,
        /// Groups visible to a project
        #[arg(long)]
        project: Option<String>,
        /// Groups containing a user
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Show one group
    GroupsShow {
        group: String,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// List a group's members
    GroupsMembers {
        group: String,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Extract URLs from a change's messages
    ExtractUrl {
        /// Substring filter (case-insensitive), or a regex with --regex
        pattern: String,
        /// Change (default: from HEAD)
        change: Option<String>,
        /// Also scan inline comments
        #[arg(long)]
        include_comments: bool,
        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// CI build state from the message stream
    BuildStatus {
        change: Option<String>,
        /// Poll until the build reaches a terminal state
        #[arg(long)]
        watch: bool,
        /// Poll interval in seconds (min 1)
        #[arg(short = 'i', long, default_value_t = 10)]
        interval: u64,
        /// Wall-clock timeout in seconds
        #[arg(long, default_value_t = 1800)]
        timeout: u64,
        /// Exit 1 when the build failed
        #[arg(long)]
        exit_status: bool,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Push HEAD for review
    Push {
        /// Target branch (default: tracking branch, then main/master)
        #[arg(short = 'b', long)]
        branch: Option<String>,
        /// Topic attached to the push
        #[arg(short = 't', long)]
        topic: Option<String>,
        /// Reviewer (repeatable)
        #[arg(short = 'r', long = "reviewer")]
        reviewers: Vec<String>,
        /// CC (repeatable)
        #[arg(long = "cc")]
        ccs: Vec<String>,
        /// Mark work-in-progress
        #[arg(long, alias = "draft")]
        wip: bool,
        /// Mark ready for review
        #[arg(long)]
        ready: bool,
        /// Mark private
        #[arg(long)]
        private: bool,
        /// Hashtag (repeatable)
        #[arg(long = "hashtag")]
        hashtags: Vec<String>,
        /// Validate and show the refspec without pushing
        #[arg(long)]
        dry_run: bool,
        /// Remote to push to (default: matching the configured host)
        #[arg(long)]
        remote: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Check a change out into the working tree
    Checkout {
        /// Change number, URL, or NNN/M shorthand
        change: String,
        /// Detach at FETCH_HEAD instead of using a review branch
        #[arg(long)]
        detach: bool,
        /// Remote to fetch from (default: matching the configured host)
        #[arg(long)]
        remote: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// AI-assisted review of a change
    Review {
        change: String,
        /// Post the review back to Gerrit (after confirmation)
        #[arg(long)]
        comment: bool,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
        /// Verbose prompt/response logging
        #[arg(long)]
        debug: bool,
        /// Replace the default review prompt
        #[arg(long)]
        prompt: Option<String>,
        /// AI tool to use (claude, llm, opencode, gemini, ...)
        #[arg(long)]
        tool: Option<String>,
        /// Extra instructions appended to both passes
        #[arg(long)]
        system_prompt: Option<String>,
        #[command(flatten)]
        fmt: FormatArgs,
    },

    /// Open a change in the browser
    Open {
        /// Change (default: from HEAD)
        change: Option<String>,
    },
}

impl Command {
    /// Presentation format of this invocation; used to lower errors at the
    /// boundary.
    pub fn format(&self) -> OutputFormat {
        match self {
            Command::Setup | Command::Open { .. } => OutputFormat::Text,
            Command::Status { fmt }
            | Command::Mine { fmt }
            | Command::Incoming { fmt, .. }
            | Command::Search { fmt, .. }
            | Command::Show { fmt, .. }
            | Command::Diff { fmt, .. }
            | Command::Comments { fmt, .. }
            | Command::Comment { fmt, .. }
            | Command::AddReviewer { fmt, .. }
            | Command::RemoveReviewer { fmt, .. }
            | Command::Vote { fmt, .. }
            | Command::Submit { fmt, .. }
            | Command::Abandon { fmt, .. }
            | Command::Restore { fmt, .. }
            | Command::Rebase { fmt, .. }
            | Command::Topic { fmt, .. }
            | Command::Projects { fmt, .. }
            | Command::Groups { fmt, .. }
            | Command::GroupsShow { fmt, .. }
            | Command::GroupsMembers { fmt, .. }
            | Command::ExtractUrl { fmt, .. }
            | Command::BuildStatus { fmt, .. }
            | Command::Push { fmt, .. }
            | Command::Checkout { fmt, .. }
            | Command::Review { fmt, .. } => fmt.format(),
        }
    }
}
