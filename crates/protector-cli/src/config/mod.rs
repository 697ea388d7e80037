//! Layered engine configuration.
//!
//! Settings are resolved from, in increasing priority: the profile file (or
//! an explicit `--config` file), `PROTECTOR_*` environment variables, and
//! command-line flags. The first two layers are merged here; flags are
//! applied by the command layer.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use protector_anonymize::ProtectorConfig;
use tracing::debug;

use crate::output::{CliError, ErrorKind};

/// Prefix of the environment variables read into the configuration.
pub const ENV_PREFIX: &str = "PROTECTOR";

/// Source of the engine configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    profile: String,
    path: PathBuf,
    explicit: bool,
    #[cfg(test)]
    env_vars: Option<config::Map<String, String>>,
}

impl Settings {
    /// Returns the configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "privacy-protector", "protector")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the path to a profile's configuration file.
    pub fn profile_path(profile: &str) -> Option<PathBuf> {
        Self::config_dir().map(|dir| {
            if profile == "default" {
                dir.join("config.toml")
            } else {
                dir.join(format!("{profile}.toml"))
            }
        })
    }

    /// Resolves the source for a profile, or for an explicit file when given.
    pub fn new(profile: &str, explicit: Option<PathBuf>) -> Result<Self, CliError> {
        match explicit {
            Some(path) => Ok(Self::from_file(profile, path)),
            None => {
                let path = Self::profile_path(profile)
                    .ok_or_else(|| CliError::config("Could not determine config directory"))?;
                Ok(Self {
                    profile: profile.to_string(),
                    path,
                    explicit: false,
                    #[cfg(test)]
                    env_vars: None,
                })
            }
        }
    }

    /// Uses `path` as the configuration file. The file must exist when loading.
    pub fn from_file(profile: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            profile: profile.to_string(),
            path: path.into(),
            explicit: true,
            #[cfg(test)]
            env_vars: None,
        }
    }

    /// Replaces the process environment with `vars`.
    #[cfg(test)]
    pub fn with_env(mut self, vars: &[(&str, &str)]) -> Self {
        self.env_vars = Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        self
    }

    /// Returns the profile name.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Returns the configuration file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the configuration file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the file and environment layers.
    pub fn load(&self) -> Result<ProtectorConfig, CliError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("enabled_categories")
            .try_parsing(true);
        #[cfg(test)]
        let env = env.source(self.env_vars.clone());

        let layered = Config::builder()
            .add_source(
                File::from(self.path.as_path())
                    .format(FileFormat::Toml)
                    .required(self.explicit),
            )
            .add_source(env)
            .build()
            .map_err(|e| {
                CliError::with_cause(
                    ErrorKind::Config,
                    format!("Failed to read configuration from {}", self.path.display()),
                    e,
                )
            })?;

        let config: ProtectorConfig = layered.try_deserialize()?;
        debug!(path = %self.path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Writes a default configuration file, returning its path.
    pub fn init(&self, force: bool) -> Result<&Path, CliError> {
        if self.exists() && !force {
            return Err(CliError::validation(format!(
                "Configuration file already exists: {} (use --force to overwrite)",
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CliError::with_cause(ErrorKind::Io, "Failed to create config directory", e)
            })?;
        }

        let content = render_toml(&ProtectorConfig::default())?;
        std::fs::write(&self.path, content).map_err(|e| {
            CliError::with_cause(
                ErrorKind::Io,
                format!("Failed to write config file: {}", self.path.display()),
                e,
            )
        })?;

        Ok(&self.path)
    }
}

/// Renders a configuration as TOML. Unset values are omitted.
pub fn render_toml(config: &ProtectorConfig) -> Result<String, CliError> {
    let mut value = serde_json::to_value(config)?;
    strip_nulls(&mut value);
    Ok(toml::to_string_pretty(&value)?)
}

fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protector_anonymize::PiiCategory;

    const SAMPLE: &str = r#"
locale = "de_DE"
seed = 42
enabled_categories = ["email", "phone"]
use_external_backend = true
backend_selector = "lexicon"

[backend_options]
terms = ["Ada Lovelace"]

[[custom_patterns]]
label = "ticket"
pattern = 'TCK-\d{4}'
"#;

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("protector.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file("default", write_sample(dir.path())).with_env(&[]);

        let config = settings.load().unwrap();
        assert_eq!(config.locale, "de_DE");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.enabled_categories, vec![PiiCategory::Email, PiiCategory::Phone]);
        assert!(config.consistent_replacements);
        assert_eq!(config.backend_options["terms"][0], "Ada Lovelace");
        assert_eq!(config.custom_patterns[0].pattern, r"TCK-\d{4}");
        assert_eq!(config.custom_patterns[0].confidence, 0.8);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file("default", write_sample(dir.path())).with_env(&[
            ("PROTECTOR_LOCALE", "fr_FR"),
            ("PROTECTOR_CONSISTENT_REPLACEMENTS", "false"),
            ("PROTECTOR_ENABLED_CATEGORIES", "ssn,ip"),
        ]);

        let config = settings.load().unwrap();
        assert_eq!(config.locale, "fr_FR");
        assert!(!config.consistent_replacements);
        assert_eq!(
            config.enabled_categories,
            vec![PiiCategory::NationalId, PiiCategory::IpAddress]
        );
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_missing_profile_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            profile: "default".to_string(),
            path: dir.path().join("config.toml"),
            explicit: false,
            env_vars: Some(config::Map::new()),
        };

        assert_eq!(settings.load().unwrap(), ProtectorConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file("default", dir.path().join("nope.toml")).with_env(&[]);

        let err = settings.load().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            Settings::from_file("default", dir.path().join("nested/config.toml")).with_env(&[]);

        settings.init(false).unwrap();
        assert_eq!(settings.load().unwrap(), ProtectorConfig::default());

        let err = settings.init(false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(settings.init(true).is_ok());
    }

    #[test]
    fn test_render_omits_unset_values() {
        let rendered = render_toml(&ProtectorConfig::default()).unwrap();
        assert!(rendered.contains("locale = \"en_US\""));
        assert!(!rendered.contains("seed"));
        assert!(!rendered.contains("backend_options"));
    }
}
