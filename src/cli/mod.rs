//! CLI module for chatr - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running queries,
//! interactive chat, and tool catalog administration.

pub mod commands;

pub use commands::Cli;
