//! Framebuffer probe.
//!
//! Usage:
//!   fbprobe info [--json]          - Map the framebuffer and print its layout
//!   fbprobe clear [--color RRGGBB] - Fill the visible area with one color
//!
//! Global flags select the device, requested depth, and config file; see
//! `fbprobe --help`.

mod cli;
mod logger;
mod report;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tendon_fb::{DisplayDevice, FbConfig, Framebuffer, LinuxBackend};

use crate::cli::{Cli, Command};
use crate::report::Report;

/// Validated subcommand.
enum Action {
    Info { json: bool },
    Clear((u8, u8, u8)),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.quiet, cli.verbose));

    let config = load_config(&cli)?;
    // Validate arguments before touching the display mode.
    let action = match &cli.command {
        Command::Info(args) => Action::Info { json: args.json },
        Command::Clear(args) => Action::Clear(parse_color(&args.color)?),
    };
    let mut fb = Framebuffer::initialize_with(&LinuxBackend, &config)
        .with_context(|| format!("Failed to initialize {}", config.device.display()))?;

    match action {
        Action::Info { json } => cmd_info(&config, &fb, json)?,
        Action::Clear((red, green, blue)) => {
            let written = fill(&mut fb, red, green, blue)?;
            log::info!("filled {written} pixels with #{red:02x}{green:02x}{blue:02x}");
        }
    }

    fb.release();
    Ok(())
}

/// Reads the config file, if any, and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<FbConfig> {
    let mut config = match &cli.config {
        Some(path) => FbConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => FbConfig::default(),
    };
    if let Some(device) = &cli.device {
        config.device.clone_from(device);
    }
    if let Some(bpp) = cli.bpp {
        config.preferred_bpp = bpp;
    }
    if cli.no_negotiate {
        config.negotiate = false;
    }
    if cli.restore {
        config.restore_on_release = true;
    }
    Ok(config)
}

fn cmd_info<D: DisplayDevice>(config: &FbConfig, fb: &Framebuffer<D>, json: bool) -> Result<()> {
    let report = Report::new(&config.device, fb);
    if json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        println!("{report}");
    }
    Ok(())
}

/// Writes one color to every visible pixel and returns the number written.
fn fill<D: DisplayDevice>(fb: &mut Framebuffer<D>, red: u8, green: u8, blue: u8) -> Result<usize> {
    let desc = *fb.descriptor();
    let bpp = desc.bytes_per_pixel as usize;
    if !(1..=4).contains(&bpp) {
        bail!("Cannot fill {}bpp pixels", desc.bits_per_pixel);
    }

    let raw = desc.channels.encode(red, green, blue).to_ne_bytes();
    let pixel = if cfg!(target_endian = "big") {
        &raw[4 - bpp..]
    } else {
        &raw[..bpp]
    };

    let Some(bytes) = fb.buffer_mut().as_mut_slice() else {
        bail!("Mapping is write-only; use access = \"read_write\"");
    };
    let mut written = 0;
    for y in 0..desc.y_resolution {
        for x in 0..desc.x_resolution {
            if let Some(offset) = desc.pixel_offset(x, y) {
                bytes[offset..offset + bpp].copy_from_slice(pixel);
                written += 1;
            }
        }
    }
    Ok(written)
}

/// Parses `RRGGBB` (optionally `#`-prefixed) into components.
fn parse_color(text: &str) -> Result<(u8, u8, u8)> {
    let hex = text.trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        bail!("Invalid color {text:?}, expected RRGGBB");
    }
    let component = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok((component(0)?, component(2)?, component(4)?))
}
