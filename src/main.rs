//! jqview CLI: run a jq-style filter over JSON and print the result.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use jqview::render::RenderMode;
use jqview::viewer::{Viewer, DEFAULT_FILTER};

#[derive(Debug, Parser)]
#[command(name = "jqview")]
#[command(about = "View JSON through a jq-style filter", long_about = None)]
#[command(version)]
struct Cli {
    /// Filter to apply (jq-style)
    #[arg(default_value = DEFAULT_FILTER)]
    filter: String,

    /// JSON input file (defaults to stdin, or a sample document)
    file: Option<PathBuf>,

    /// Emit colorized HTML instead of plain text
    #[arg(long)]
    colors: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mode = if cli.colors {
        RenderMode::Colorized
    } else {
        RenderMode::Plain
    };

    let mut viewer = Viewer::new(mode);
    viewer.set_filter(cli.filter);
    if let Some(input) = read_input(cli.file.as_deref())? {
        viewer.set_input(input);
    }

    let started = Instant::now();
    let output = viewer.refresh();
    log::debug!("evaluated filter in {:?}", started.elapsed());

    println!("{}", output);
    Ok(())
}

/// Input precedence: named file, then piped stdin, then the built-in
/// sample document (`None`).
fn read_input(file: Option<&std::path::Path>) -> Result<Option<String>> {
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(Some(text));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        log::debug!("no input file or pipe, using sample document");
        return Ok(None);
    }

    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
    Ok(Some(text))
}
