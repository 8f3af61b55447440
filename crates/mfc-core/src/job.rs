//! Job model: one file-level compress/decompress unit of work.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Compression level: the library default or an explicit 0-9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Default,
    Explicit(u32),
}

impl Level {
    pub const MAX: u32 = 9;

    /// Validate an operator-supplied level.
    pub fn new(level: u32) -> Result<Self, ConfigError> {
        if level > Self::MAX {
            return Err(ConfigError::InvalidLevel(level));
        }
        Ok(Level::Explicit(level))
    }

    /// `None` maps to the library default.
    pub fn from_option(level: Option<u32>) -> Result<Self, ConfigError> {
        level.map_or(Ok(Level::Default), Level::new)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Default => write!(f, "default"),
            Level::Explicit(n) => write!(f, "{}", n),
        }
    }
}

/// Direction of a job. The level only exists for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress(Level),
    Decompress,
}

impl Mode {
    pub fn is_compress(&self) -> bool {
        matches!(self, Mode::Compress(_))
    }

    /// Verb used in summary lines ("Compression completed in ...").
    pub fn noun(&self) -> &'static str {
        match self {
            Mode::Compress(_) => "Compression",
            Mode::Decompress => "Decompression",
        }
    }
}

/// Immutable description of one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    source: PathBuf,
    destination: PathBuf,
    mode: Mode,
}

impl Job {
    pub fn compress(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, level: Level) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode: Mode::Compress(level),
        }
    }

    pub fn decompress(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode: Mode::Decompress,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}
