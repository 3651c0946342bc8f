use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "tripanel",
    about = "Three-panel terminal command console relaying entered commands to a single peer"
)]
pub(crate) struct CliArgs {
    /// ip:port on which to listen for the peer connection
    #[arg(long, conflicts_with = "unix")]
    pub(crate) tcp: Option<String>,

    /// Path of a unix stream socket on which to listen for the peer connection
    #[arg(long)]
    pub(crate) unix: Option<PathBuf>,

    /// Panel stacking order, top to bottom: three of o (output), e (errors),
    /// h (history), c (command), with exactly one of e/h
    #[arg(long, default_value = "oec")]
    pub(crate) order: String,

    /// Append debug information to this file
    #[arg(long)]
    pub(crate) debug_log: Option<PathBuf>,
}
