//! orthoglyph CLI entry point.
//!
//! Grounded on the teacher's `main.rs` (clap derive `Cli` struct, file-or-
//! stdin input, optional output file), extended with a TOML config file
//! and `tracing-subscriber` logging per SPEC_FULL.md §A3/§A4.

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use orthoglyph::charset::UnicodeLevel;
use orthoglyph::config::RenderSettings;
use orthoglyph::diagram::Diagram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnicodeLevelArg {
    None,
    Basic,
    Extended,
    Full,
}

impl From<UnicodeLevelArg> for UnicodeLevel {
    fn from(arg: UnicodeLevelArg) -> Self {
        match arg {
            UnicodeLevelArg::None => UnicodeLevel::None,
            UnicodeLevelArg::Basic => UnicodeLevel::Basic,
            UnicodeLevelArg::Extended => UnicodeLevel::Extended,
            UnicodeLevelArg::Full => UnicodeLevel::Full,
        }
    }
}

/// Render a JSON diagram description to ASCII/Unicode box-drawing art.
#[derive(Parser, Debug)]
#[command(name = "orthoglyph", about = "Orthogonal grid router and box-drawing renderer")]
struct Cli {
    /// Input diagram JSON file (reads from stdin if not provided)
    input: Option<String>,

    /// TOML file overriding default render settings
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Terminal box-drawing capability level
    #[arg(long = "unicode-level", value_enum)]
    unicode_level: Option<UnicodeLevelArg>,

    /// Emit ANSI colour escapes for styled nodes/connections
    #[arg(long = "color")]
    color: bool,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,
}

fn load_settings(cli: &Cli) -> Result<RenderSettings> {
    let mut settings = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("cannot read config '{path}'"))?;
            RenderSettings::from_toml_str(&text).with_context(|| format!("invalid config '{path}'"))?
        }
        None => RenderSettings::default(),
    };
    if let Some(level) = cli.unicode_level {
        settings.unicode_level = level.into();
    }
    if cli.color {
        settings.color = true;
    }
    Ok(settings)
}

fn read_input(cli: &Cli) -> Result<String> {
    match &cli.input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("cannot read '{path}'")),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("cannot read stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let text = read_input(&cli)?;

    let diagram: Diagram = serde_json::from_str(&text).context("failed to decode diagram JSON")?;
    let rendered = orthoglyph::render(&diagram, &settings).map_err(anyhow::Error::from)?;

    match &cli.output {
        Some(path) => fs::write(path, rendered).with_context(|| format!("cannot write '{path}'"))?,
        None => {
            print!("{rendered}");
            io::stdout().flush().context("cannot flush stdout")?;
        }
    }

    Ok(())
}
