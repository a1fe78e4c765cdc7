use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub openai_config: OpenAIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

// Whisper refuses uploads above 25 MiB.
fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

/// Credentials and model settings for the OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_transcription_language")]
    pub transcription_language: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_transcription_language() -> String {
    "en".to_string()
}

fn default_chat_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

impl Config {
    /// Load configuration from a YAML or JSON file, expanding `${VAR}`
    /// references from the process environment.
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load configuration from a file, expanding `${VAR}` references
    /// through `lookup`.
    pub fn load_with<F>(path: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path))?;
        let content = substitute_env_vars(&decode_text(&bytes), &lookup);

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON configuration in {}", path))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML configuration in {}", path))?
        };
        Ok(config)
    }

    /// Configuration for this process. Variables from a `.env` file in the
    /// working directory fill in anything the real environment lacks.
    pub fn from_env() -> Result<Self> {
        let dotenv = read_dotenv(Path::new(".env"));
        Self::resolve(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    /// Discover and load the configuration file named by `CONFIG_PATH`, or
    /// `conf.yaml` / `conf.json`, then apply overrides. Missing files fall
    /// back to defaults.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let candidates: Vec<String> = vec![
            lookup("CONFIG_PATH"),
            Some("conf.yaml".to_string()),
            Some("conf.json".to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut config = None;
        for path in &candidates {
            if !Path::new(path).exists() {
                debug!("No configuration at {}", path);
                continue;
            }
            config = Some(Self::load_with(path, &lookup)?);
            info!("Loaded configuration from: {}", path);
            break;
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No configuration file found, using defaults");
            Config::default()
        });

        if has_placeholder(&config.openai_config.api_key) {
            warn!("api_key references an unset variable: {}", config.openai_config.api_key);
            config.openai_config.api_key.clear();
        }
        config.apply_env_overrides(&lookup);

        if config.openai_config.api_key.is_empty() {
            warn!("OPENAI_API_KEY is not set; transcription and translation requests will fail");
        }

        Ok(config)
    }

    /// Apply `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `PORT` overrides.
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_config.api_key = key;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai_config.base_url = url;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.system_config.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            templates_dir: default_templates_dir(),
            static_dir: default_static_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            transcription_model: default_transcription_model(),
            transcription_language: default_transcription_language(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
        }
    }
}

/// Decode file bytes as UTF-8, dropping a BOM if one is present.
fn decode_text(bytes: &[u8]) -> String {
    let (cow, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        warn!("Configuration file contains invalid UTF-8; replaced offending bytes");
    }
    cow.into_owned()
}

fn placeholder_pattern() -> Regex {
    Regex::new(r"\$\{(\w+)\}").expect("static regex")
}

/// Replace `${VAR_NAME}` with the variable's value. Unset variables are
/// left untouched.
fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    placeholder_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn has_placeholder(value: &str) -> bool {
    placeholder_pattern().is_match(value)
}

/// Read `KEY=value` pairs from a dotenv file without touching the process
/// environment. A missing or unreadable file yields nothing.
fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return HashMap::new(),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    let mut vars = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                vars.insert(key, value);
            }
            Err(e) => warn!("Skipping malformed line in {}: {}", path.display(), e),
        }
    }
    debug!("Read {} variables from {}", vars.len(), path.display());
    vars
}
