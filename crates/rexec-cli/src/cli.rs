use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rexec_model::{JobRef, NamedPath};
use rexec_observe::{LoggerFormat, LoggerLevel};

/// Run a one-off task on a remote build service
#[derive(Parser, Debug)]
#[command(name = "rexec", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the build service
    #[arg(long, global = true, env = "REXEC_ENDPOINT", value_name = "URL", default_value = "http://localhost:8080")]
    pub endpoint: String,

    /// Bearer token for the build service
    #[arg(long, global = true, env = "REXEC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log filter directive (e.g. `info`, `rexec_core=debug`)
    #[arg(long, global = true, value_name = "DIRECTIVE", default_value = "warn")]
    pub log_level: LoggerLevel,

    /// Log output format: text, json or journald
    #[arg(long, global = true, value_name = "FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a task once, streaming its output
    Execute(ExecuteArgs),
}

#[derive(Args, Debug)]
pub struct ExecuteArgs {
    /// Task config file
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Run the task with elevated privileges
    #[arg(short, long)]
    pub privileged: bool,

    /// Skip files ignored by git when uploading inputs
    #[arg(short = 'x', long)]
    pub exclude_ignored: bool,

    /// Upload a local directory as a task input
    #[arg(short, long = "input", value_name = "NAME=PATH")]
    pub inputs: Vec<NamedPath>,

    /// Take unmapped inputs from the latest build of a job
    #[arg(short = 'j', long, value_name = "PIPELINE/JOB")]
    pub inputs_from: Option<JobRef>,

    /// Download a task output into a local directory
    #[arg(short, long = "output", value_name = "NAME=PATH")]
    pub outputs: Vec<NamedPath>,

    /// Only run on workers with this tag
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Extra arguments appended to the task command
    #[arg(last = true, value_name = "ARGS")]
    pub task_args: Vec<String>,
}
