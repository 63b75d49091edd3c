//! Credential and endpoint configuration
//!
//! Values are read from the process environment first and then from an env
//! file. The env file is parsed into memory and never written into the
//! process environment.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const API_KEY_VAR: &str = "WATSONX_API_KEY";
pub const PROJECT_ID_VAR: &str = "WATSONX_PROJECT_ID";
pub const URL_VAR: &str = "WATSONX_URL";
pub const IAM_URL_VAR: &str = "WATSONX_IAM_URL";
pub const API_VERSION_VAR: &str = "WATSONX_API_VERSION";
pub const TIMEOUT_VAR: &str = "WATSONX_TIMEOUT_SECS";
pub const MAX_RETRIES_VAR: &str = "WATSONX_MAX_RETRIES";

// Names used by the original `.env` layout.
const LEGACY_API_KEY_VAR: &str = "api_key";
const LEGACY_PROJECT_ID_VAR: &str = "project_id";

pub const DEFAULT_SERVICE_URL: &str = "https://us-south.ml.cloud.ibm.com";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_API_VERSION: &str = "2023-05-29";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_RETRIES: usize = 2;

/// Layered variable source: process environment, then env file contents.
///
/// An exported but blank variable does not hide a value from the file.
#[derive(Debug)]
pub struct EnvSource {
    file_vars: HashMap<String, String>,
    use_process_env: bool,
}

impl Default for EnvSource {
    fn default() -> Self {
        Self {
            file_vars: HashMap::new(),
            use_process_env: true,
        }
    }
}

impl EnvSource {
    /// Parse `path`, or `.env` in the working directory when `None`.
    ///
    /// A missing default `.env` is fine; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let iter = match path {
            Some(path) => dotenvy::from_path_iter(path)?,
            None => match dotenvy::dotenv_iter() {
                Ok(iter) => iter,
                Err(e) if e.not_found() => {
                    tracing::debug!("No .env file found, using process environment only");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e.into()),
            },
        };

        let file_vars = iter
            .map(|item| item.map_err(Error::from))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            file_vars,
            ..Self::default()
        })
    }

    /// Resolve from the env file contents only.
    #[cfg(test)]
    fn file_only(mut self) -> Self {
        self.use_process_env = false;
        self
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let process = if self.use_process_env {
            std::env::var(name).ok()
        } else {
            None
        };
        layered(process, self.file_vars.get(name))
    }
}

fn layered(process: Option<String>, file: Option<&String>) -> Option<String> {
    process
        .filter(|value| !value.trim().is_empty())
        .or_else(|| file.cloned())
}

/// API key and project id. Always fully populated once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    project_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Result<Self> {
        let api_key = non_empty(api_key.into())
            .ok_or_else(|| Error::Configuration("API key must not be empty".to_string()))?;
        let project_id = non_empty(project_id.into())
            .ok_or_else(|| Error::Configuration("Project ID must not be empty".to_string()))?;

        Ok(Self {
            api_key,
            project_id,
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, API_KEY_VAR, LEGACY_API_KEY_VAR)?;
        let project_id = required(&lookup, PROJECT_ID_VAR, LEGACY_PROJECT_ID_VAR)?;
        Self::new(api_key, project_id)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &redact(&self.api_key))
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Load credentials from the environment and `env_file` (or `.env`).
pub fn load_credentials(env_file: Option<&Path>) -> Result<Credentials> {
    credentials_from_env(&EnvSource::load(env_file)?)
}

pub fn credentials_from_env(env: &EnvSource) -> Result<Credentials> {
    let credentials = Credentials::from_lookup(|name| env.get(name))?;

    tracing::info!("API Key: {}", redact(credentials.api_key()));
    tracing::info!("Project ID: {}", credentials.project_id());

    Ok(credentials)
}

/// Service endpoints and transport settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub service_url: String,
    pub iam_url: String,
    pub api_version: String,
    pub timeout: Duration,
    pub max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            iam_url: DEFAULT_IAM_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl Config {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let optional = |name: &str| lookup(name).and_then(non_empty);

        Ok(Self {
            service_url: optional(URL_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.service_url),
            iam_url: optional(IAM_URL_VAR).unwrap_or(defaults.iam_url),
            api_version: optional(API_VERSION_VAR).unwrap_or(defaults.api_version),
            timeout: match optional(TIMEOUT_VAR) {
                Some(raw) => Duration::from_secs(parse_number(TIMEOUT_VAR, &raw)?),
                None => defaults.timeout,
            },
            max_retries: match optional(MAX_RETRIES_VAR) {
                Some(raw) => parse_number(MAX_RETRIES_VAR, &raw)?,
                None => defaults.max_retries,
            },
        })
    }

    pub fn from_env(env: &EnvSource) -> Result<Self> {
        Self::from_lookup(|name| env.get(name))
    }

    /// Full text generation URL including the API version query.
    pub fn generation_url(&self) -> String {
        format!(
            "{}/ml/v1-beta/generation/text?version={}",
            self.service_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

/// Mask all but the last four characters of a secret.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn required<F>(lookup: &F, primary: &str, legacy: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(primary)
        .and_then(non_empty)
        .or_else(|| lookup(legacy).and_then(non_empty))
        .ok_or_else(|| {
            Error::Configuration(format!(
                "{} must be set in the environment or .env file",
                primary
            ))
        })
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        Error::Configuration(format!("{} must be a non-negative integer, got '{}'", name, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (API_KEY_VAR, "my-api-key"),
            (PROJECT_ID_VAR, "project-123"),
        ]))
        .unwrap();

        assert_eq!(creds.api_key(), "my-api-key");
        assert_eq!(creds.project_id(), "project-123");
    }

    #[test]
    fn test_credentials_accept_legacy_names() {
        let creds = Credentials::from_lookup(lookup_from(&[
            ("api_key", "legacy-key"),
            ("project_id", "legacy-project"),
        ]))
        .unwrap();

        assert_eq!(creds.api_key(), "legacy-key");
        assert_eq!(creds.project_id(), "legacy-project");
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = Credentials::from_lookup(lookup_from(&[(PROJECT_ID_VAR, "project-123")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains(API_KEY_VAR)));
    }

    #[test]
    fn test_missing_project_id_is_configuration_error() {
        let err =
            Credentials::from_lookup(lookup_from(&[(API_KEY_VAR, "my-api-key")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains(PROJECT_ID_VAR)));
    }

    #[test]
    fn test_empty_values_are_configuration_errors() {
        let err = Credentials::from_lookup(lookup_from(&[
            (API_KEY_VAR, ""),
            (PROJECT_ID_VAR, "project-123"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = Credentials::from_lookup(lookup_from(&[
            (API_KEY_VAR, "my-api-key"),
            (PROJECT_ID_VAR, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        assert!(matches!(
            Credentials::new("", ""),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_credentials_debug_redacts_api_key() {
        let creds = Credentials::new("abcdefghijklmnop", "project-123").unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("abcdefghijklmnop"));
        assert!(debug.contains("****mnop"));
        assert!(debug.contains("project-123"));
    }

    #[test]
    fn test_redact_short_secret() {
        assert_eq!(redact("short"), "****");
        assert_eq!(redact(""), "****");
        assert_eq!(redact("0123456789"), "****6789");
    }

    #[test]
    fn test_env_file_is_read_without_touching_process_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "WATSONX_DEMO_TEST_ONLY_KEY=from-file").unwrap();
        writeln!(file, "# comment line").unwrap();
        writeln!(file, "WATSONX_DEMO_TEST_ONLY_OTHER=\"quoted value\"").unwrap();

        let env = EnvSource::load(Some(file.path())).unwrap();
        assert_eq!(
            env.get("WATSONX_DEMO_TEST_ONLY_KEY").as_deref(),
            Some("from-file")
        );
        assert_eq!(
            env.get("WATSONX_DEMO_TEST_ONLY_OTHER").as_deref(),
            Some("quoted value")
        );
        assert!(std::env::var("WATSONX_DEMO_TEST_ONLY_KEY").is_err());
    }

    #[test]
    fn test_load_credentials_from_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "WATSONX_API_KEY=file-api-key-1234").unwrap();
        writeln!(file, "WATSONX_PROJECT_ID=file-project").unwrap();

        let env = EnvSource::load(Some(file.path())).unwrap().file_only();
        let creds = credentials_from_env(&env).unwrap();
        assert_eq!(creds.api_key(), "file-api-key-1234");
        assert_eq!(creds.project_id(), "file-project");
    }

    #[test]
    fn test_load_credentials_never_returns_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "WATSONX_API_KEY=file-api-key-1234").unwrap();
        writeln!(file, "WATSONX_PROJECT_ID=").unwrap();

        let env = EnvSource::load(Some(file.path())).unwrap().file_only();
        let err = credentials_from_env(&env).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_load_credentials_with_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_credentials(Some(&dir.path().join("absent.env"))).unwrap_err();
        assert!(matches!(err, Error::EnvFile(_)));
    }

    #[test]
    fn test_file_only_ignores_process_env() {
        // PATH is exported in every test environment.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "PATH=/from/file").unwrap();

        let env = EnvSource::load(Some(file.path())).unwrap().file_only();
        assert_eq!(env.get("PATH").as_deref(), Some("/from/file"));
    }

    #[test]
    fn test_blank_process_value_falls_through_to_file() {
        let file_value = "file-api-key-1234".to_string();

        assert_eq!(
            layered(Some(String::new()), Some(&file_value)).as_deref(),
            Some("file-api-key-1234")
        );
        assert_eq!(
            layered(Some("   ".to_string()), Some(&file_value)).as_deref(),
            Some("file-api-key-1234")
        );
        assert_eq!(
            layered(Some("exported-key".to_string()), Some(&file_value)).as_deref(),
            Some("exported-key")
        );
        assert_eq!(layered(Some(String::new()), None), None);
    }

    #[test]
    fn test_missing_explicit_env_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EnvSource::load(Some(&dir.path().join("missing.env"))).unwrap_err();
        assert!(matches!(err, Error::EnvFile(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.generation_url(),
            "https://us-south.ml.cloud.ibm.com/ml/v1-beta/generation/text?version=2023-05-29"
        );
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (URL_VAR, "https://eu-de.ml.cloud.ibm.com/"),
            (IAM_URL_VAR, "http://localhost:1234/token"),
            (API_VERSION_VAR, "2024-01-01"),
            (TIMEOUT_VAR, "5"),
            (MAX_RETRIES_VAR, "0"),
        ]))
        .unwrap();

        assert_eq!(config.service_url, "https://eu-de.ml.cloud.ibm.com");
        assert_eq!(config.iam_url, "http://localhost:1234/token");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 0);
        assert_eq!(
            config.generation_url(),
            "https://eu-de.ml.cloud.ibm.com/ml/v1-beta/generation/text?version=2024-01-01"
        );
    }

    #[test]
    fn test_config_rejects_invalid_numbers() {
        let err = Config::from_lookup(lookup_from(&[(TIMEOUT_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains(TIMEOUT_VAR)));
    }
}
