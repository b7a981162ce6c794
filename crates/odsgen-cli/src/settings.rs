use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use odsgen_generate::LocaleKey;

use crate::CliError;

/// Config file picked up from the working directory when `--config` is
/// not given.
pub const DEFAULT_CONFIG_FILE: &str = "odsgen.toml";
pub const DEFAULT_OUT_DIR: &str = "data";

/// Optional `odsgen.toml` values. Command-line flags win over these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub out_dir: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub progress_every: Option<u64>,
    pub seed: Option<u64>,
    pub locale: Option<LocaleKey>,
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self, CliError> {
        let settings: Settings =
            toml::from_str(contents).map_err(|err| CliError::Config(err.to_string()))?;
        if settings.batch_size == Some(0) {
            return Err(CliError::Config("batch_size must be at least 1".to_string()));
        }
        if settings.progress_every == Some(0) {
            return Err(CliError::Config(
                "progress_every must be at least 1".to_string(),
            ));
        }
        Ok(settings)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }
}

/// Load `explicit`, or `odsgen.toml` if present, or defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(Settings::default());
            }
            default
        }
    };
    let contents = std::fs::read_to_string(&path).map_err(|err| {
        CliError::Config(format!("cannot read {}: {err}", path.display()))
    })?;
    let settings = Settings::from_toml(&contents)?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let settings = Settings::from_toml(
            r#"
out_dir = "/tmp/ods"
batch_size = 2000
progress_every = 10000
seed = 42
locale = "en_US"
"#,
        )
        .expect("settings");

        assert_eq!(settings.out_dir(), PathBuf::from("/tmp/ods"));
        assert_eq!(settings.batch_size, Some(2000));
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.locale, Some(LocaleKey::EnUs));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::from_toml("").expect("settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.out_dir(), PathBuf::from("data"));
    }

    #[test]
    fn rejects_unknown_keys_and_zero_batches() {
        assert!(matches!(
            Settings::from_toml("batchsize = 10"),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("batch_size = 0"),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load_settings(Some(Path::new("/definitely/not/here/odsgen.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
