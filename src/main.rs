//! Bench Charts - benchmark result tables to publication bar charts
//!
//! Loads CSV result tables, averages repeated timing trials and writes one
//! bar chart per metric.

mod charts;
mod data;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use charts::ImageFormat;
use report::{Preset, ReportConfig, ReportRunner};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in figure set to render.
    #[arg(long, value_enum, default_value_t = Preset::Paper)]
    preset: Preset,

    /// JSON report configuration; replaces the preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the result tables.
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Directory the figures are written to.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Image format, repeat for several.
    #[arg(long = "format", value_enum)]
    formats: Vec<ImageFormat>,

    /// Only render the chart group with this name.
    #[arg(long)]
    only: Option<String>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(ReportConfig, Option<String>, bool)> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_json_file(path)?,
            None => ReportConfig::preset(self.preset),
        };

        if let Some(dir) = self.results_dir {
            config.results_dir = dir;
        }
        if let Some(dir) = self.out_dir {
            config.out_dir = dir;
        }
        if !self.formats.is_empty() {
            config.formats = self.formats;
        }

        Ok((config, self.only, self.dump_config))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, only, dump_config) = Args::parse().into_config()?;

    if dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    config.validate().context("checking report configuration")?;

    let written = ReportRunner::new(&config)
        .run(only.as_deref())
        .context("rendering report")?;

    if written.is_empty() {
        log::warn!("no figures written");
    } else {
        log::info!(
            "wrote {} figures to {}",
            written.len(),
            config.out_dir.display()
        );
    }
    Ok(())
}
