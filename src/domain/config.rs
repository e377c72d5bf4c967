use std::{collections::BTreeSet, path::Path};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::{AvailabilityPolicy, slot::hhmm};

/// Which availability rule to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Block a fixed set of start times.
    #[default]
    Denylist,
    /// Block slots overlapping an existing booking.
    Overlap,
}

/// Configuration for the booking workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The availability rule.
    pub policy: PolicyKind,

    /// Start times that are always unavailable under the denylist policy.
    ///
    /// Ignored by the overlap policy.
    blocked_start_times: BTreeSet<NaiveTime>,

    /// Whether approving a pending request creates a confirmed booking.
    ///
    /// When `false`, approval only removes the request.
    pub materialize_on_approval: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            blocked_start_times: AvailabilityPolicy::default_blocked_start_times(),
            materialize_on_approval: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration if the file exists, otherwise returns the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The start times blocked under the denylist policy.
    #[must_use]
    pub const fn blocked_start_times(&self) -> &BTreeSet<NaiveTime> {
        &self.blocked_start_times
    }

    /// Adds a blocked start time.
    ///
    /// Returns `true` if it was not already blocked.
    pub fn block_start_time(&mut self, time: NaiveTime) -> bool {
        self.blocked_start_times.insert(time)
    }

    /// The availability policy this configuration selects.
    #[must_use]
    pub fn availability_policy(&self) -> AvailabilityPolicy {
        match self.policy {
            PolicyKind::Denylist => AvailabilityPolicy::Denylist(self.blocked_start_times.clone()),
            PolicyKind::Overlap => AvailabilityPolicy::Overlap,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_blocked_start_times() -> BTreeSet<NaiveTime> {
    AvailabilityPolicy::default_blocked_start_times()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        policy: PolicyKind,

        #[serde(default = "default_blocked_start_times", with = "hhmm::many")]
        blocked_start_times: BTreeSet<NaiveTime>,

        #[serde(default = "default_true")]
        materialize_on_approval: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                policy,
                blocked_start_times,
                materialize_on_approval,
            } => Self {
                policy,
                blocked_start_times,
                materialize_on_approval,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            policy: config.policy,
            blocked_start_times: config.blocked_start_times,
            materialize_on_approval: config.materialize_on_approval,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::slot::parse_time;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\npolicy = \"overlap\"\nblocked_start_times = [\"09:00\"]\nmaterialize_on_approval = false\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.policy, PolicyKind::Overlap);
        assert_eq!(
            config.blocked_start_times().iter().copied().collect::<Vec<_>>(),
            [parse_time("09:00").unwrap()]
        );
        assert!(!config.materialize_on_approval);
        assert_eq!(config.availability_policy(), AvailabilityPolicy::Overlap);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));

        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());
    }

    #[test]
    fn load_invalid_time_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nblocked_start_times = [\"2pm\"]\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.availability_policy(), AvailabilityPolicy::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.block_start_time(parse_time("08:30").unwrap());
        config.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"08:30\""));
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
