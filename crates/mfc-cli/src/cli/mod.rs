//! CLI for the MFC compression tool.

mod commands;
mod menu;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mfc_core::config;
use mfc_core::logger::Logger;
use std::path::PathBuf;

/// Largest accepted `--size-mib` (1 TiB).
const MAX_BENCH_MIB: u64 = 1024 * 1024;

use commands::{run_bench, run_compress, run_decompress, BenchArgs};
pub use menu::Menu;

/// Top-level CLI. Without a subcommand the interactive menu starts.
#[derive(Debug, Parser)]
#[command(name = "mfc")]
#[command(about = "MFC: multithreaded file compression", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Compress a file, or every regular file directly inside a directory.
    Compress {
        /// File or directory to compress.
        input: PathBuf,
        /// Directory for the `.gz` outputs (created if missing).
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Worker threads (default from config).
        #[arg(short = 'j', long, value_name = "N")]
        jobs: Option<usize>,
        /// Compression level 0-9 (0 = fastest, 9 = best; default from config, else library default).
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: Option<u32>,
    },

    /// Decompress a file, or every `.gz` file directly inside a directory.
    Decompress {
        /// File or directory to decompress.
        input: PathBuf,
        /// Directory for the restored files (created if missing).
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Worker threads (default from config).
        #[arg(short = 'j', long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Compare one worker over one payload against N workers over N copies.
    Bench {
        /// Worker count and number of payload copies (default from config).
        #[arg(short = 'j', long, value_name = "N")]
        jobs: Option<usize>,
        /// Payload size in MiB, 1 to 1048576 (default from config).
        #[arg(long, value_name = "MIB", value_parser = clap::value_parser!(u64).range(1..=MAX_BENCH_MIB))]
        size_mib: Option<u64>,
        /// Directory for the payload and artifacts (default: current directory).
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Remove the payload, copies and artifacts afterwards.
        #[arg(long)]
        clean: bool,
    },

    /// Interactive numbered menu (the default).
    Menu,
}

pub fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    let logger = Logger::stdout();

    match cli.command {
        Some(CliCommand::Compress {
            input,
            output,
            jobs,
            level,
        }) => {
            let summary = run_compress(&cfg, &logger, &input, &output, jobs, level)?;
            commands::ensure_all_succeeded(&summary)?;
        }
        Some(CliCommand::Decompress { input, output, jobs }) => {
            let summary = run_decompress(&cfg, &logger, &input, &output, jobs)?;
            commands::ensure_all_succeeded(&summary)?;
        }
        Some(CliCommand::Bench {
            jobs,
            size_mib,
            dir,
            clean,
        }) => {
            let dir = match dir {
                Some(d) => d,
                None => std::env::current_dir()?,
            };
            let args = BenchArgs {
                jobs,
                size_mib,
                dir,
                clean,
            };
            run_bench(&cfg, &logger, &args)?;
        }
        Some(CliCommand::Menu) | None => {
            let stdin = std::io::stdin();
            let mut menu = Menu::new(stdin.lock(), std::io::stdout(), &cfg, &logger);
            menu.run()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
