//! Command-line interface definitions for fbprobe.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and exercise a Linux framebuffer device.
#[derive(Parser)]
#[command(name = "fbprobe", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with framebuffer settings.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Device node (overrides the config file).
    #[arg(long, short = 'd', global = true)]
    pub device: Option<PathBuf>,

    /// Bits per pixel to request (overrides the config file).
    #[arg(long, global = true)]
    pub bpp: Option<u32>,

    /// Keep the current pixel format instead of requesting one.
    #[arg(long, global = true)]
    pub no_negotiate: bool,

    /// Restore the original display mode on exit.
    #[arg(long, global = true)]
    pub restore: bool,

    /// Only print errors.
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print negotiation and mapping diagnostics.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Map the framebuffer and print its geometry and pixel layout.
    Info(InfoArgs),
    /// Fill the visible area with a single color.
    Clear(ClearArgs),
}

/// Arguments for the `info` subcommand.
#[derive(Parser)]
pub struct InfoArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `clear` subcommand.
#[derive(Parser)]
pub struct ClearArgs {
    /// Color as `RRGGBB` hex.
    #[arg(long, default_value = "000000")]
    pub color: String,
}
