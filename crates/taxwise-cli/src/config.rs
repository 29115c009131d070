//! Configuration file management for taxwise.
//!
//! Provides a TOML-based config file at `~/.config/taxwise/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taxwise_core::advisor::command::{DEFAULT_ARGS, DEFAULT_COMMAND};
use taxwise_db::config::DbConfig;

/// Env var holding the owning user's id.
pub const USER_ID_ENV: &str = "TAXWISE_USER_ID";

/// Env var overriding the advisor binary.
pub const ADVISOR_COMMAND_ENV: &str = "TAXWISE_ADVISOR_COMMAND";

/// Advisor deadline when the config file does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub user: UserSection,
    #[serde(default)]
    pub advisor: AdvisorSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSection {
    /// Owner id stamped on every generated plan.
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorSection {
    pub command: String,
    pub args: Vec<String>,
    /// Zero disables the deadline.
    pub timeout_secs: u64,
}

impl Default for AdvisorSection {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AdvisorSection {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the taxwise config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/taxwise` or `~/.config/taxwise`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("taxwise");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("taxwise")
}

/// Return the path to the taxwise config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct TaxwiseConfig {
    pub db_config: DbConfig,
    /// `None` when neither the env var nor the config file names a user.
    pub user_id: Option<Uuid>,
    pub advisor: AdvisorSection,
}

impl TaxwiseConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `TAXWISE_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - User id: `TAXWISE_USER_ID` > `user.id`
    /// - Advisor command: `TAXWISE_ADVISOR_COMMAND` > `advisor.command` > `claude`
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };
        let db_config = DbConfig::new(db_url);

        let user_id = if let Ok(raw) = std::env::var(USER_ID_ENV) {
            Some(
                raw.trim()
                    .parse::<Uuid>()
                    .with_context(|| format!("{USER_ID_ENV} is not a valid UUID: {raw:?}"))?,
            )
        } else {
            file_config.as_ref().map(|cfg| cfg.user.id)
        };

        let mut advisor = file_config
            .map(|cfg| cfg.advisor)
            .unwrap_or_default();
        if let Ok(command) = std::env::var(ADVISOR_COMMAND_ENV) {
            advisor.command = command;
            advisor.args.clear();
        }

        Ok(Self {
            db_config,
            user_id,
            advisor,
        })
    }

    /// The owning user, or an error telling the operator how to set one.
    pub fn require_user(&self) -> Result<Uuid> {
        match self.user_id {
            Some(id) => Ok(id),
            None => bail!("no user id configured; set {USER_ID_ENV} or run `taxwise init`"),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point the config dir at an empty temp dir and clear taxwise env vars.
    fn isolated_env() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
        unsafe { std::env::remove_var(USER_ID_ENV) };
        unsafe { std::env::remove_var(ADVISOR_COMMAND_ENV) };
        tmp
    }

    fn sample_config(user: Uuid) -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://filehost:5432/filedb".to_string(),
            },
            user: UserSection { id: user },
            advisor: AdvisorSection {
                command: "my-llm".to_string(),
                args: vec!["--quiet".to_string()],
                timeout_secs: 30,
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        let user = Uuid::new_v4();
        save_config(&sample_config(user)).unwrap();
        let loaded = load_config().unwrap();

        assert_eq!(loaded.database.url, "postgresql://filehost:5432/filedb");
        assert_eq!(loaded.user.id, user);
        assert_eq!(loaded.advisor.command, "my-llm");
        assert_eq!(loaded.advisor.timeout(), Some(Duration::from_secs(30)));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let _tmp = isolated_env();

        save_config(&sample_config(Uuid::new_v4())).unwrap();
        let meta = std::fs::metadata(config_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn advisor_section_is_optional() {
        let parsed: ConfigFile = toml::from_str(
            "[database]\nurl = \"postgresql://x/y\"\n\n[user]\nid = \"6f1c1f0e-8a4b-4d5e-9c1a-2b3c4d5e6f70\"\n",
        )
        .unwrap();
        assert_eq!(parsed.advisor, AdvisorSection::default());
        assert_eq!(parsed.advisor.command, "claude");
        assert_eq!(parsed.advisor.args, vec!["-p".to_string()]);
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let section = AdvisorSection {
            timeout_secs: 0,
            ..AdvisorSection::default()
        };
        assert_eq!(section.timeout(), None);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        save_config(&sample_config(Uuid::new_v4())).unwrap();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };

        let config = TaxwiseConfig::resolve(Some("postgresql://cli:5432/clidb")).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");

        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
    }

    #[test]
    fn resolve_env_overrides_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        save_config(&sample_config(Uuid::new_v4())).unwrap();

        let env_user = Uuid::new_v4();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var(USER_ID_ENV, env_user.to_string()) };
        unsafe { std::env::set_var(ADVISOR_COMMAND_ENV, "other-llm") };

        let config = TaxwiseConfig::resolve(None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.user_id, Some(env_user));
        assert_eq!(config.advisor.command, "other-llm");
        assert!(config.advisor.args.is_empty());
        assert_eq!(config.advisor.timeout_secs, 30);

        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
        unsafe { std::env::remove_var(USER_ID_ENV) };
        unsafe { std::env::remove_var(ADVISOR_COMMAND_ENV) };
    }

    #[test]
    fn resolve_reads_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        let user = Uuid::new_v4();
        save_config(&sample_config(user)).unwrap();

        let config = TaxwiseConfig::resolve(None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://filehost:5432/filedb");
        assert_eq!(config.require_user().unwrap(), user);
        assert_eq!(config.advisor.args, vec!["--quiet".to_string()]);
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        let config = TaxwiseConfig::resolve(None).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert_eq!(config.advisor, AdvisorSection::default());
        assert!(config.user_id.is_none());

        let msg = config.require_user().unwrap_err().to_string();
        assert!(msg.contains("taxwise init"), "unexpected error: {msg}");
    }

    #[test]
    fn resolve_rejects_malformed_user_id() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        unsafe { std::env::set_var(USER_ID_ENV, "not-a-uuid") };

        let result = TaxwiseConfig::resolve(None);

        unsafe { std::env::remove_var(USER_ID_ENV) };
        assert!(result.is_err());
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        let path = config_path();
        assert!(
            path.ends_with("taxwise/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
