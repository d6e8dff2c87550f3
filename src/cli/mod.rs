//! CLI module - Command-line interface for Recipebox
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Recipebox - recipe management API server
#[derive(Parser)]
#[command(name = "recipebox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (default)
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create an account with staff and superuser rights
    #[command(name = "create-superuser")]
    CreateSuperuser {
        /// Email address of the new account
        email: String,

        /// Password; prompted on stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Write a default config.toml if none exists
    Init,
}

pub use commands::*;
