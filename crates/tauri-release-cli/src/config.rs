//! Host configuration and argument validation.
//!
//! Every value can come from a flag or from the environment variables GitHub
//! Actions sets for each job.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use tauri_release_core::host::github::{DEFAULT_API_URL, GithubConfig, parse_repository};

/// Connection to the repository hosting the release.
#[derive(Debug, Clone, Args)]
pub struct HostArgs {
    /// Token used for every API call
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Commit a newly created release tag points at
    #[arg(long, env = "GITHUB_SHA", default_value = "")]
    pub sha: String,

    /// REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

impl HostArgs {
    /// Validated connection settings.
    pub fn github_config(&self) -> Result<GithubConfig> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .context("GITHUB_TOKEN (or --token) is required")?;
        let repository = self
            .repository
            .as_deref()
            .context("GITHUB_REPOSITORY (or --repository) is required")?;
        let (owner, repo) = parse_repository(repository)
            .with_context(|| format!("Repository must be owner/repo, got {repository:?}"))?;

        Ok(GithubConfig {
            api_url: self.api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            owner,
            repo,
        })
    }
}

/// `--expected-artifacts`: an integer of at least 1.
pub fn parse_expected_artifacts(value: &str) -> Result<usize, String> {
    let count: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("{value:?} is not a non-negative integer"))?;
    if count == 0 {
        return Err("expected artifact count must be at least 1".to_string());
    }
    Ok(count)
}

/// `--updater-name`: a `.json` file name with a non-empty stem.
pub fn parse_updater_name(value: &str) -> Result<String, String> {
    let Some(stem) = value.strip_suffix(".json") else {
        return Err(format!("updater name {value:?} must end with .json"));
    };
    if stem.is_empty() || value.contains(['/', '\\']) {
        return Err(format!("updater name {value:?} is not a plain file name"));
    }
    Ok(value.to_string())
}

/// `--pub-date`: any RFC 3339 timestamp, normalized to UTC.
pub fn parse_pub_date(value: &str) -> Result<String, String> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|d| format_pub_date(d.with_timezone(&Utc)))
        .map_err(|e| format!("{value:?} is not an RFC 3339 date: {e}"))
}

/// Manifest timestamp format.
pub fn format_pub_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Fail unless `sha` looks usable as a tag target.
pub fn require_sha(sha: &str) -> Result<&str> {
    let sha = sha.trim();
    if sha.is_empty() {
        bail!("GITHUB_SHA (or --sha) is required to create a release");
    }
    Ok(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(token: Option<&str>, repository: Option<&str>) -> HostArgs {
        HostArgs {
            token: token.map(str::to_string),
            repository: repository.map(str::to_string),
            sha: String::new(),
            api_url: "https://ghe.example.com/api/v3/".to_string(),
        }
    }

    #[test]
    fn test_github_config() {
        let config = host(Some("t"), Some("acme/app")).github_config().unwrap();
        assert_eq!(config.owner, "acme");
        assert_eq!(config.repo, "app");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");

        assert!(host(None, Some("acme/app")).github_config().is_err());
        assert!(host(Some(" "), Some("acme/app")).github_config().is_err());
        assert!(host(Some("t"), Some("acme")).github_config().is_err());
        assert!(host(Some("t"), None).github_config().is_err());
    }

    #[test]
    fn test_expected_artifacts() {
        assert_eq!(parse_expected_artifacts("6"), Ok(6));
        assert!(parse_expected_artifacts("0").is_err());
        assert!(parse_expected_artifacts("-1").is_err());
        assert!(parse_expected_artifacts("six").is_err());
    }

    #[test]
    fn test_updater_name() {
        assert_eq!(parse_updater_name("latest.json"), Ok("latest.json".to_string()));
        assert!(parse_updater_name(".json").is_err());
        assert!(parse_updater_name("latest.yml").is_err());
        assert!(parse_updater_name("dir/latest.json").is_err());
    }

    #[test]
    fn test_pub_date_is_normalized() {
        assert_eq!(
            parse_pub_date("2024-03-06T10:05:07+01:00"),
            Ok("2024-03-06T09:05:07Z".to_string())
        );
        assert!(parse_pub_date("yesterday").is_err());
    }

    #[test]
    fn test_require_sha() {
        assert_eq!(require_sha(" abc ").unwrap(), "abc");
        assert!(require_sha("").is_err());
    }
}
