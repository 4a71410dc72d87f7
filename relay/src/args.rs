use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Relay streaming chat service
#[derive(Debug, Parser)]
#[command(name = "relay", about = "Streams LLM chat completions to clients as server-sent events")]
pub struct Args {
    /// Path to configuration file; built-in defaults apply when omitted
    #[arg(short, long, env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "RELAY_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directive, e.g. `info` or `relay_agent=debug`
    #[arg(long, env = "RELAY_LOG", default_value = "info")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream a single completion to stdout instead of serving
    Ask(AskArgs),
}

#[derive(Debug, clap::Args)]
pub struct AskArgs {
    /// Provider name, e.g. `moonshot`
    #[arg(long)]
    pub provider: String,

    /// Model name as the provider knows it
    #[arg(long)]
    pub model: String,

    #[arg(long, default_value = "You are a helpful assistant.")]
    pub system_prompt: String,

    /// User message to send
    pub prompt: String,
}
