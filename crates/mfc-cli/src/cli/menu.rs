//! Interactive numbered menu: compress, decompress, benchmark, exit.
//!
//! Prompts go to `out`; job progress goes through the shared [`Logger`].
//! A bad answer or a failed operation is reported and the menu is shown
//! again. End of input exits.

use anyhow::{Context, Result};
use mfc_core::config::MfcConfig;
use mfc_core::job::Level;
use mfc_core::logger::Logger;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use super::commands::{run_bench, run_compress, run_decompress, BenchArgs};

const BANNER: &str = "MFC Multithreaded File Compression Tool";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Compress,
    Decompress,
    Bench,
    Exit,
}

impl MenuChoice {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(MenuChoice::Compress),
            "2" => Some(MenuChoice::Decompress),
            "3" => Some(MenuChoice::Bench),
            "4" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Answers that ended the prompt sequence early.
enum Answer<T> {
    Value(T),
    Invalid(String),
    Eof,
}

pub struct Menu<'a, R, O, L: Write> {
    input: R,
    out: O,
    cfg: &'a MfcConfig,
    logger: &'a Logger<L>,
}

impl<'a, R, O, L> Menu<'a, R, O, L>
where
    R: BufRead,
    O: Write,
    L: Write + Send,
{
    pub fn new(input: R, out: O, cfg: &'a MfcConfig, logger: &'a Logger<L>) -> Self {
        Self {
            input,
            out,
            cfg,
            logger,
        }
    }

    /// Show the menu until the user picks exit or input ends.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{}", BANNER)?;
        writeln!(self.out, "{}", "=".repeat(BANNER.len()))?;

        loop {
            self.show_menu()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.out)?;
                break;
            };
            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.out, "Invalid choice!")?;
                continue;
            };
            tracing::debug!(?choice, "menu selection");

            let outcome = match choice {
                MenuChoice::Compress => self.compress()?,
                MenuChoice::Decompress => self.decompress()?,
                MenuChoice::Bench => self.bench(),
                MenuChoice::Exit => {
                    writeln!(self.out, "Exiting program...")?;
                    break;
                }
            };
            match outcome {
                Answer::Value(Ok(())) => {}
                Answer::Value(Err(e)) => writeln!(self.out, "Error: {:#}", e)?,
                Answer::Invalid(msg) => writeln!(self.out, "{}", msg)?,
                Answer::Eof => break,
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn show_menu(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "===== Multithreaded File Compression Tool =====")?;
        writeln!(self.out, "1. Compress file(s)")?;
        writeln!(self.out, "2. Decompress file(s)")?;
        writeln!(self.out, "3. Benchmark (compare single vs multi-threaded)")?;
        writeln!(self.out, "4. Exit")?;
        write!(self.out, "Enter your choice: ")?;
        self.out.flush()?;
        Ok(())
    }

    fn compress(&mut self) -> Result<Answer<Result<()>>> {
        let Some((input, output, jobs)) = self.ask_paths_and_threads()? else {
            return Ok(Answer::Eof);
        };
        let jobs = match jobs {
            Answer::Value(j) => j,
            Answer::Invalid(m) => return Ok(Answer::Invalid(m)),
            Answer::Eof => return Ok(Answer::Eof),
        };
        let level = match self.ask_number::<u32>("Compression level (0-9, 0=fastest, 9=best): ")? {
            Answer::Value(Some(l)) if l > Level::MAX => {
                return Ok(Answer::Invalid(format!("Invalid compression level: {}", l)))
            }
            Answer::Value(l) => l,
            Answer::Invalid(m) => return Ok(Answer::Invalid(m)),
            Answer::Eof => return Ok(Answer::Eof),
        };
        let res = run_compress(self.cfg, self.logger, &input, &output, jobs, level).map(|_| ());
        Ok(Answer::Value(res))
    }

    fn decompress(&mut self) -> Result<Answer<Result<()>>> {
        let Some((input, output, jobs)) = self.ask_paths_and_threads()? else {
            return Ok(Answer::Eof);
        };
        let jobs = match jobs {
            Answer::Value(j) => j,
            Answer::Invalid(m) => return Ok(Answer::Invalid(m)),
            Answer::Eof => return Ok(Answer::Eof),
        };
        let res = run_decompress(self.cfg, self.logger, &input, &output, jobs).map(|_| ());
        Ok(Answer::Value(res))
    }

    fn bench(&mut self) -> Answer<Result<()>> {
        let res = std::env::current_dir()
            .context("resolve current directory")
            .and_then(|dir| {
                let args = BenchArgs {
                    jobs: None,
                    size_mib: None,
                    dir,
                    clean: false,
                };
                run_bench(self.cfg, self.logger, &args).map(|_| ())
            });
        Answer::Value(res)
    }

    /// Input path, output directory and thread count. `None` on end of input.
    #[allow(clippy::type_complexity)]
    fn ask_paths_and_threads(&mut self) -> Result<Option<(PathBuf, PathBuf, Answer<Option<usize>>)>> {
        let Some(input) = self.ask("Enter input file/directory: ")? else {
            return Ok(None);
        };
        let Some(output) = self.ask("Enter output directory: ")? else {
            return Ok(None);
        };
        let output = if output.is_empty() { ".".to_string() } else { output };
        let threads = match self.ask_number::<usize>("Number of threads: ")? {
            Answer::Value(Some(0)) => Answer::Invalid("Invalid number of threads: 0".to_string()),
            other => other,
        };
        Ok(Some((PathBuf::from(input), PathBuf::from(output), threads)))
    }

    /// Blank answer means "use the configured default".
    fn ask_number<T: std::str::FromStr>(&mut self, prompt: &str) -> Result<Answer<Option<T>>> {
        let Some(answer) = self.ask(prompt)? else {
            return Ok(Answer::Eof);
        };
        if answer.is_empty() {
            return Ok(Answer::Value(None));
        }
        Ok(match answer.parse::<T>() {
            Ok(v) => Answer::Value(Some(v)),
            Err(_) => Answer::Invalid(format!("Invalid number: {}", answer)),
        })
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        self.read_line()
    }

    /// Next trimmed line; `None` at end of input. Bytes that are not UTF-8
    /// become replacement characters and fail as an ordinary bad answer.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = Vec::new();
        let n = self.input.read_until(b'\n', &mut line).context("read from stdin")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }
}
