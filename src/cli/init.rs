use std::{fs, path::Path};

use roombook::Config;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Overwrite an existing configuration file
    #[arg(long)]
    force: bool,
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, path: &Path) -> anyhow::Result<()> {
        if path.exists() && !self.force {
            anyhow::bail!(
                "Configuration already exists at {} (use --force to overwrite)",
                path.display()
            );
        }

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", dir.display()))?;
        }

        Config::default()
            .save(path)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;

        println!("Initialized configuration in {}", path.display());
        println!();
        println!("Next steps:");
        println!("  roombook account add admin --role admin");
        println!("  roombook session");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use roombook::domain::PolicyKind;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn writes_default_config() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(".roombook/config.toml");

        Command { force: false }.run(&path).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.policy, PolicyKind::Denylist);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "policy = \"overlap\"\n_version = \"1\"\n").unwrap();

        let err = Command { force: false }.run(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        Command { force: true }.run(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
