use std::path::{Path, PathBuf};

use dialoguer::Password;
use roombook::{CredentialStore, Role, Username};
use tracing::instrument;

use super::terminal::Colorize;

/// Default location of the credential file.
pub const CREDENTIALS_PATH: &str = ".roombook/credentials.toml";

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Add an account, prompting for its password
    Add(Add),

    /// List accounts and their roles
    List(List),
}

impl Command {
    pub fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Add(command) => command.run(),
            Self::List(command) => command.run(),
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Self::User,
            RoleArg::Admin => Self::Admin,
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// Login name
    username: String,

    /// Role granted to the account
    #[arg(long, value_enum, default_value = "user")]
    role: RoleArg,

    /// Credential file
    #[arg(long, value_name = "PATH", default_value = CREDENTIALS_PATH)]
    credentials: PathBuf,
}

impl Add {
    fn run(self) -> anyhow::Result<()> {
        let password = Password::new()
            .with_prompt(format!("Password for {}", self.username))
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?;

        add_account(&self.credentials, &self.username, self.role.into(), &password)?;

        println!(
            "{} {} ({}) to {}",
            "Added".success(),
            self.username.trim(),
            Role::from(self.role),
            self.credentials.display()
        );
        Ok(())
    }
}

#[instrument(skip(password))]
fn add_account(path: &Path, username: &str, role: Role, password: &str) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let username = Username::new(username)?;
    let mut store = CredentialStore::load_or_default(path)?;
    store.add_account(username, role, password)?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    store.save(path)?;
    Ok(())
}

#[derive(Debug, clap::Parser)]
pub struct List {
    /// Credential file
    #[arg(long, value_name = "PATH", default_value = CREDENTIALS_PATH)]
    credentials: PathBuf,
}

impl List {
    fn run(self) -> anyhow::Result<()> {
        let store = CredentialStore::load_or_default(&self.credentials)?;

        let mut accounts = store.accounts().peekable();
        if accounts.peek().is_none() {
            println!(
                "{}",
                "No accounts yet. Create one with 'roombook account add'.".dim()
            );
            return Ok(());
        }

        for account in accounts {
            let role = match account.role {
                Role::Admin => account.role.to_string().info(),
                Role::User => account.role.to_string(),
            };
            println!("{:<20} {role}", account.username.as_str());
        }
        Ok(())
    }
}
