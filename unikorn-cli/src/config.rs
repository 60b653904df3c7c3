use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_poll_period_secs")]
    pub poll_period_secs: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_period_secs: default_poll_period_secs(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_poll_period_secs() -> u64 {
    60
}

fn default_data_dir() -> PathBuf {
    unikorn_home().unwrap_or_else(|_| PathBuf::from(".unikorn"))
}

pub fn unikorn_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".unikorn"))
}

pub fn ensure_unikorn_home() -> Result<PathBuf> {
    let dir = unikorn_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_unikorn_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_poll_period() {
        let cfg = Config::default();
        assert_eq!(cfg.poll_period_secs, 60);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.poll_period_secs, 60);
    }

    #[test]
    fn explicit_poll_period_round_trips() {
        let cfg: Config = toml::from_str("poll_period_secs = 60\ndata_dir = \"/tmp/unikorn\"\n").unwrap();
        assert_eq!(cfg.poll_period_secs, 60);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/unikorn"));
    }
}
