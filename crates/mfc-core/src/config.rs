use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default chunk size for codec input/output buffers (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Default size of the synthetic benchmark payload (100 MiB).
pub const DEFAULT_BENCH_PAYLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Rejected settings. Raised before any job starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("worker count must be at least 1 (got {0})")]
    InvalidWorkerCount(usize),
    #[error("compression level must be between 0 and 9 (got {0})")]
    InvalidLevel(u32),
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Benchmark parameters (optional `[bench]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Size of the generated payload file in bytes.
    pub payload_bytes: u64,
    /// Worker count (and number of payload copies) for the parallel run.
    pub workers: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            payload_bytes: DEFAULT_BENCH_PAYLOAD_BYTES,
            workers: 4,
        }
    }
}

/// Global configuration loaded from `~/.config/mfc/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfcConfig {
    /// Worker threads used by compress/decompress when not given on the command line.
    pub workers: usize,
    /// Compression level 0-9; None = library default.
    #[serde(default)]
    pub level: Option<u32>,
    /// Size of each codec input and output chunk in bytes.
    pub chunk_size_bytes: usize,
    /// fsync each destination before renaming it into place.
    #[serde(default)]
    pub sync_output: bool,
    #[serde(default)]
    pub bench: BenchConfig,
}

impl Default for MfcConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            level: None,
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            sync_output: false,
            bench: BenchConfig::default(),
        }
    }
}

impl MfcConfig {
    /// Check every field that would otherwise fail later inside a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers < 1 {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }
        if self.bench.workers < 1 {
            return Err(ConfigError::InvalidWorkerCount(self.bench.workers));
        }
        if let Some(level) = self.level {
            if level > 9 {
                return Err(ConfigError::InvalidLevel(level));
            }
        }
        if self.chunk_size_bytes == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mfc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MfcConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MfcConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MfcConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MfcConfig::default();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.level, None);
        assert_eq!(cfg.chunk_size_bytes, 1024 * 1024);
        assert!(!cfg.sync_output);
        assert_eq!(cfg.bench.payload_bytes, 100 * 1024 * 1024);
        assert_eq!(cfg.bench.workers, 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MfcConfig {
            level: Some(9),
            ..MfcConfig::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MfcConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.workers, cfg.workers);
        assert_eq!(parsed.level, Some(9));
        assert_eq!(parsed.chunk_size_bytes, cfg.chunk_size_bytes);
        assert_eq!(parsed.bench.payload_bytes, cfg.bench.payload_bytes);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            workers = 8
            chunk_size_bytes = 65536
            sync_output = true

            [bench]
            payload_bytes = 10_485_760
            workers = 2
        "#;
        let cfg: MfcConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.workers, 8);
        assert_eq!(cfg.chunk_size_bytes, 65536);
        assert!(cfg.sync_output);
        assert!(cfg.level.is_none());
        assert_eq!(cfg.bench.payload_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.bench.workers, 2);
    }

    #[test]
    fn config_toml_missing_bench_uses_defaults() {
        let toml = r#"
            workers = 2
            level = 1
            chunk_size_bytes = 4096
        "#;
        let cfg: MfcConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.level, Some(1));
        assert_eq!(cfg.bench.workers, 4);
        assert_eq!(cfg.bench.payload_bytes, DEFAULT_BENCH_PAYLOAD_BYTES);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = MfcConfig {
            workers: 0,
            ..MfcConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidWorkerCount(0)));

        let cfg = MfcConfig {
            level: Some(10),
            ..MfcConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidLevel(10)));

        let cfg = MfcConfig {
            chunk_size_bytes: 0,
            ..MfcConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidChunkSize));
    }
}
