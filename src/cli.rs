// src/cli.rs
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};

use crate::config::options::ConvertOptions;
use crate::file::resolve_out_path;
use crate::pipeline::RunSummary;
use crate::progress::Progress;
use crate::worker::{self, Job};

/// Keep a dated stock table of a saved basket page in an .xlsx workbook
#[derive(Parser, Debug)]
#[command(name = "xlsx_scrape", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Options file (TOML); flags below override it
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Table column to order rows by (0 = id, 1 = name, ...)
    #[arg(long, global = true, value_name = "N")]
    pub sort_column: Option<usize>,

    /// Leading columns taken from the fresh page on update
    #[arg(long, global = true, value_name = "N")]
    pub key_columns: Option<usize>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Scrape a saved page into a new workbook
    Create {
        /// Saved basket page (.html)
        html: PathBuf,
        /// Output file or directory (default: out/basket.xlsx)
        #[arg(short, long, value_name = "OUTPUT")]
        out: Option<PathBuf>,
    },
    /// Merge a saved page into an existing workbook
    Update {
        /// Saved basket page (.html)
        html: PathBuf,
        /// Workbook written by an earlier run
        workbook: PathBuf,
        /// Output file or directory (default: overwrite WORKBOOK)
        #[arg(short, long, value_name = "OUTPUT")]
        out: Option<PathBuf>,
    },
}

impl Args {
    /// Options file (or defaults) with command-line overrides applied.
    pub fn options(&self) -> Result<ConvertOptions> {
        let mut opts = match &self.config {
            Some(path) => ConvertOptions::from_toml_file(path)
                .wrap_err_with(|| format!("loading options from {}", path.display()))?,
            None => ConvertOptions::default(),
        };
        if let Some(n) = self.sort_column { opts.sort_column = n; }
        if let Some(n) = self.key_columns { opts.key_columns = n; }
        Ok(opts)
    }

    pub fn job(&self) -> Result<Job> {
        let job = match &self.command {
            Command::Create { html, out } => Job::Create {
                html: html.clone(),
                out: resolve_out_path(out.as_deref())?,
            },
            Command::Update { html, workbook, out } => Job::Update {
                html: html.clone(),
                workbook: workbook.clone(),
                out: match out {
                    Some(o) => resolve_out_path(Some(o.as_path()))?,
                    None => workbook.clone(),
                },
            },
        };
        Ok(job)
    }
}

/// Progress lines to stderr, so stdout only carries the summary.
struct CliProgress;

impl Progress for CliProgress {
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
}

pub fn run() -> Result<()> {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> Result<()> {
    crate::log::init(args.verbose);
    let opts = args.options()?;
    let job = args.job()?;
    logf!("Run: {:?}", job);

    let summary = worker::spawn(job, opts).wait(&mut CliProgress)?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(s: &RunSummary) {
    println!("Wrote {} ({} rows, {} columns)", s.out_path.display(), s.rows, s.columns);
    if s.new_rows > 0 || s.dropped_rows > 0 {
        println!("{} new, {} no longer listed", s.new_rows, s.dropped_rows);
    }
}
