// Tool configuration
//
// Layered the usual way: built-in defaults, then an optional TOML file,
// then MEGARAID_* environment variables.

use crate::{RaidError, RaidResult};
use ::config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default MegaCLI binary, looked up on `PATH`
pub const DEFAULT_BINARY: &str = "MegaCli64";

/// Upper bound for every textual attribute copied out of tool output
pub const DEFAULT_MAX_ATTR_LEN: usize = 100;

/// Capacity of the `enclosure:slot,...` list passed to `-CfgLdAdd`
pub const DEFAULT_MAX_PD_LIST_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// MegaCLI executable (absolute path or name on `PATH`)
    pub binary: String,
    /// Arguments appended to every invocation after the per-call ones
    pub extra_args: Vec<String>,
    /// Truncation bound for string attributes
    pub max_attr_len: usize,
    /// Hard capacity of the physical drive list buffer
    pub max_pd_list_len: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            extra_args: Vec::new(),
            max_attr_len: DEFAULT_MAX_ATTR_LEN,
            max_pd_list_len: DEFAULT_MAX_PD_LIST_LEN,
        }
    }
}

impl ToolConfig {
    /// Per-user config file location, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "megaraid-manager").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration. An explicit `path` must exist; the per-user
    /// default file is optional.
    pub fn load(path: Option<&Path>) -> RaidResult<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("binary", defaults.binary)?
            .set_default("extra_args", Vec::<String>::new())?
            .set_default("max_attr_len", defaults.max_attr_len as u64)?
            .set_default("max_pd_list_len", defaults.max_pd_list_len as u64)?;

        match path {
            Some(explicit) => {
                builder = builder.add_source(File::from(explicit).format(FileFormat::Toml));
            }
            None => {
                if let Some(user) = Self::default_path() {
                    builder = builder.add_source(
                        File::from(user.as_path())
                            .format(FileFormat::Toml)
                            .required(false),
                    );
                }
            }
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("MEGARAID")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("extra_args"),
            )
            .build()?;

        let config: ToolConfig = settings.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            binary = %config.binary,
            max_attr_len = config.max_attr_len,
            max_pd_list_len = config.max_pd_list_len,
            "Loaded tool configuration"
        );

        Ok(config)
    }

    pub fn validate(&self) -> RaidResult<()> {
        if self.binary.trim().is_empty() {
            return Err(RaidError::Config("binary must not be empty".to_string()));
        }
        if self.max_attr_len == 0 {
            return Err(RaidError::Config("max_attr_len must be positive".to_string()));
        }
        // Room for at least one "e:s" entry plus the terminator
        if self.max_pd_list_len < 4 {
            return Err(RaidError::Config(format!(
                "max_pd_list_len {} is too small",
                self.max_pd_list_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env() {
        for key in [
            "MEGARAID_BINARY",
            "MEGARAID_EXTRA_ARGS",
            "MEGARAID_MAX_ATTR_LEN",
            "MEGARAID_MAX_PD_LIST_LEN",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ToolConfig::default();
        assert_eq!(config.binary, DEFAULT_BINARY);
        assert!(config.extra_args.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "binary = \"/opt/MegaRAID/MegaCli/MegaCli64\"\nmax_attr_len = 32\nextra_args = [\"-NoLog\"]"
        )
        .unwrap();

        let config = ToolConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.binary, "/opt/MegaRAID/MegaCli/MegaCli64");
        assert_eq!(config.max_attr_len, 32);
        assert_eq!(config.max_pd_list_len, DEFAULT_MAX_PD_LIST_LEN);
        assert_eq!(config.extra_args, vec!["-NoLog".to_string()]);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "binary = \"/usr/sbin/MegaCli\"").unwrap();

        std::env::set_var("MEGARAID_BINARY", "/opt/sbin/MegaCli64");
        std::env::set_var("MEGARAID_MAX_PD_LIST_LEN", "128");
        let config = ToolConfig::load(Some(file.path()));
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.binary, "/opt/sbin/MegaCli64");
        assert_eq!(config.max_pd_list_len, 128);
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        clear_env();
        let result = ToolConfig::load(Some(Path::new("/nonexistent/megaraid.toml")));
        assert!(matches!(result, Err(RaidError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_attr_len() {
        let config = ToolConfig {
            max_attr_len: 0,
            ..ToolConfig::default()
        };
        assert!(matches!(config.validate(), Err(RaidError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_binary() {
        let config = ToolConfig {
            binary: "  ".to_string(),
            ..ToolConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
