//! Command-line interface definition for Synopsis
//!
//! This module defines the CLI structure using clap's derive API. Each
//! subcommand maps to one page of the product: authentication screens,
//! the summarize form, chat, and the history viewer.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Synopsis - summarize text, URLs and documents, and chat with an assistant
#[derive(Parser, Debug, Clone)]
#[command(name = "synopsis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Override the API base URL (e.g. http://localhost:8000/api/v1)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Synopsis
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the welcome screen
    Home,

    /// Create a new account
    Register {
        #[arg(long)]
        email: String,

        #[arg(short, long)]
        username: String,

        #[arg(long)]
        full_name: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long, env = "SYNOPSIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in and store the session token
    Login {
        /// Username or email
        #[arg(short, long)]
        username: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "SYNOPSIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Check the stored token against the server
    Verify,

    /// Summarize text, a web page, or a document
    Summarize {
        /// Text to summarize
        #[arg(long, conflicts_with_all = ["url", "file"], required_unless_present_any = ["url", "file"])]
        text: Option<String>,

        /// URL of a page to summarize
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Document to upload (.pdf, .doc, .docx, .txt)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Summary length
        #[arg(short, long, value_enum)]
        length: Option<SummaryLengthArg>,

        /// Save the summary text to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print only the summary text (for piping to a clipboard tool)
        #[arg(long)]
        raw: bool,
    },

    /// Chat with the assistant (interactive unless --message is given)
    Chat {
        /// Session to open
        #[arg(short, long)]
        session: Option<String>,

        /// Send a single message and exit
        #[arg(short, long)]
        message: Option<String>,

        /// Attach a document to the message
        #[arg(short, long)]
        attach: Option<PathBuf>,
    },

    /// Manage chat sessions
    Sessions {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Browse summary and chat history
    History {
        /// Which list to show
        #[arg(short, long, value_enum, default_value_t = HistoryTabArg::Chats)]
        tab: HistoryTabArg,

        #[command(subcommand)]
        command: Option<HistoryCommand>,
    },

    /// Single-turn question without a session
    Ask {
        message: String,

        /// Extra context (e.g. a summary) to ground the answer
        #[arg(long)]
        context: Option<String>,
    },
}

/// Chat session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List chat sessions
    List,

    /// Create a new session
    New {
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Delete a session
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print a session's messages
    Show { id: String },

    /// Remove all messages from a session
    Clear { id: String },
}

/// History subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// Show one stored summary
    Show { id: i64 },

    /// Delete a chat session from history
    Delete {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryLengthArg {
    Short,
    Medium,
    Detailed,
}

impl SummaryLengthArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Detailed => "detailed",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryTabArg {
    Chats,
    Summaries,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
