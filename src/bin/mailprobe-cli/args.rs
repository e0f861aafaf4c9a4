use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use mailprobe_lib::ValidationContext;

#[derive(Parser)]
#[command(name = "mailprobe-cli", version)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// name announced in HELO/EHLO
    #[arg(long, env = "MAILPROBE_HELO", default_value = "localhost", global = true)]
    pub helo: String,

    /// MAIL FROM envelope sender (default postmaster@<helo>)
    #[arg(long = "from", env = "MAILPROBE_FROM", global = true)]
    pub mail_from: Option<String>,

    /// SMTP port
    #[arg(long, default_value_t = 25, global = true)]
    pub port: u16,

    /// per-connection deadline in ms, 0 disables it
    #[arg(long = "timeout", default_value_t = 5_000, global = true)]
    pub timeout_ms: u64,

    /// format: human|json
    #[arg(long, default_value = "human", global = true)]
    pub format: String,

    /// print the SMTP dialogue
    #[arg(long, global = true)]
    pub transcript: bool,

    /// debug logs on stderr (needs `with-tracing`)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// probe a single address
    Validate { email: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn context(&self) -> ValidationContext {
        let mail_from = self
            .mail_from
            .clone()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("postmaster@{}", self.helo));
        ValidationContext::new(self.helo.clone(), mail_from)
            .with_port(self.port)
            .with_deadline(Duration::from_millis(self.timeout_ms))
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        match self.format.as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown format '{other}', use human|json"),
        }
    }
}
