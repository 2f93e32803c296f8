use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    #[error("{0} environment variable is empty")]
    Empty(&'static str),
    #[error("GITHUB_REPOSITORY must be in owner/name form, got {0:?}")]
    BadRepository(String),
    #[error("ISSUE_NUMBER must be a positive integer, got {0:?}")]
    BadIssueNumber(String),
}

/// Inputs supplied by the workflow that triggered the run.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub issue_number: u64,
    pub api_url: String,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::Missing(key))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(key));
            }
            Ok(value)
        };

        let token = required("GITHUB_TOKEN")?;
        let repository = required("GITHUB_REPOSITORY")?;
        let (owner, repo) = match repository.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                (owner.to_string(), repo.to_string())
            }
            _ => return Err(ConfigError::BadRepository(repository.clone())),
        };

        let raw_number = required("ISSUE_NUMBER")?;
        let issue_number = raw_number
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::BadIssueNumber(raw_number.clone()))?;

        let api_url = lookup("GITHUB_API_URL")
            .filter(|u| !u.trim().is_empty())
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            token,
            owner,
            repo,
            issue_number,
            api_url,
        })
    }
}

/// Formatting rules applied to bug reports.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Rules {
    pub keywords: Vec<String>,
    pub min_title_words: usize,
    pub max_title_words: usize,
    pub min_commit_id_len: usize,
    pub max_commit_id_len: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            keywords: [
                "Python",
                "Installing requirements for Web UI",
                "Commit hash",
                "Launching Web UI with arguments",
                "Model loaded",
                "text2video",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            min_title_words: 3,
            max_title_words: 9,
            min_commit_id_len: 7,
            max_commit_id_len: 40,
        }
    }
}

/// Load rules from `ISSUE_CHECKER_RULES` if set, otherwise the defaults.
pub fn load_rules() -> Result<Rules> {
    match std::env::var("ISSUE_CHECKER_RULES") {
        Ok(path) if !path.trim().is_empty() => load_rules_from(Path::new(path.trim())),
        _ => Ok(Rules::default()),
    }
}

pub fn load_rules_from(path: &Path) -> Result<Rules> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules from {}", path.display()))?;
    let rules: Rules = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if rules.min_title_words > rules.max_title_words {
        anyhow::bail!(
            "min_title_words ({}) exceeds max_title_words ({})",
            rules.min_title_words,
            rules.max_title_words
        );
    }
    if rules.min_commit_id_len > rules.max_commit_id_len {
        anyhow::bail!(
            "min_commit_id_len ({}) exceeds max_commit_id_len ({})",
            rules.min_commit_id_len,
            rules.max_commit_id_len
        );
    }
    Ok(rules)
}
