//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - ask: run one query through the pipeline
//! - repl: interactive chat loop
//! - tools: list and toggle catalog tools

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatr - chat orchestration with keyword tool routing
#[derive(Parser, Debug)]
#[command(name = "chatr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one query through the pipeline
    Ask {
        /// The query to answer
        query: String,

        /// Session id (generated when absent)
        #[arg(short, long)]
        session: Option<String>,

        /// Comma-separated active tools (defaults to all enabled tools)
        #[arg(short, long, value_delimiter = ',')]
        tools: Option<Vec<String>>,
    },

    /// Interactive chat session
    Repl {
        /// Session id (generated when absent)
        #[arg(short, long)]
        session: Option<String>,

        /// Comma-separated active tools (defaults to all enabled tools)
        #[arg(short, long, value_delimiter = ',')]
        tools: Option<Vec<String>>,
    },

    /// Tool catalog administration
    Tools {
        #[command(subcommand)]
        command: ToolCommands,
    },
}

/// Tool catalog subcommands
#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// List catalog tools with their status
    List,

    /// Flip a tool's enabled flag
    Toggle {
        /// Tool name
        name: String,
    },
}
