//! Configuration module
//!
//! Directory credentials and the location of the departments workbook come from
//! INI-style config files, environment variables and command-line overrides.
//! The result is a plain [`Config`] value passed to whatever builds the
//! hierarchy and the directory client; nothing is kept in global state.
//!
//! Config files are read in this order, later ones overriding earlier ones:
//!
//! - `/etc/uoa-groups/config`
//! - `~<SUDO_USER>/.uoa-groups/config` when running under sudo
//! - `~/.uoa-groups/config`
//! - `UOA_*` environment variables (e.g. `UOA_LDAP__USERNAME`)

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{
    CONF_DEPARTMENTS_FILE_NAME, CONF_FILE_NAME, CONF_FOLDER_NAME, CONF_SYSTEM_DIR,
    DEFAULT_BASE_DN, DEFAULT_LDAP_URL, DEFAULT_PAGE_SIZE, ENV_PREFIX,
};
use crate::error::{AppError, AppResult};

/// Directory connection settings
#[derive(Clone)]
pub struct LdapConfig {
    pub url: String,
    pub base_dn: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub page_size: i32,
    /// Accept self-signed server certificates.
    pub accept_invalid_certs: bool,
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("url", &self.url)
            .field("base_dn", &self.base_dn)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("page_size", &self.page_size)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LDAP_URL.to_string(),
            base_dn: DEFAULT_BASE_DN.to_string(),
            username: None,
            password: None,
            page_size: DEFAULT_PAGE_SIZE,
            accept_invalid_certs: true,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub ldap: LdapConfig,
    pub departments_file: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    #[serde(alias = "LDAP")]
    ldap: LdapSection,
    departments_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LdapSection {
    url: Option<String>,
    base_dn: Option<String>,
    username: Option<String>,
    password: Option<String>,
    page_size: Option<i32>,
    accept_invalid_certs: Option<bool>,
}

/// Where configuration and the departments workbook are looked for
#[derive(Clone, Debug)]
pub struct ConfigPaths {
    pub system_dir: PathBuf,
    pub home_dir: Option<PathBuf>,
    pub sudo_user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn new(system_dir: impl Into<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            system_dir: system_dir.into(),
            home_dir,
            sudo_user_dir: None,
        }
    }

    /// Standard locations: `/etc/uoa-groups`, `~/.uoa-groups` and, under sudo,
    /// the invoking user's `~/.uoa-groups`.
    pub fn discover() -> Self {
        Self::for_user(dirs::home_dir(), env::var("SUDO_USER").ok())
    }

    /// Standard locations for a process whose home is `home` and that was started
    /// through sudo by `sudo_user`, if any. The sudo user's directory is dropped
    /// when it is the same as the home one.
    pub fn for_user(home: Option<PathBuf>, sudo_user: Option<String>) -> Self {
        let hidden = format!(".{}", CONF_FOLDER_NAME);
        let home_dir = home.map(|home| home.join(&hidden));
        let sudo_user_dir = sudo_user
            .filter(|user| !user.is_empty())
            .map(|user| PathBuf::from("/home").join(user).join(&hidden))
            .filter(|dir| Some(dir) != home_dir.as_ref());

        Self {
            sudo_user_dir,
            ..Self::new(CONF_SYSTEM_DIR, home_dir)
        }
    }

    /// Config files, lowest precedence first.
    pub fn config_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = vec![self.system_dir.join(CONF_FILE_NAME)];
        if let Some(dir) = &self.sudo_user_dir {
            candidates.push(dir.join(CONF_FILE_NAME));
        }
        if let Some(dir) = &self.home_dir {
            candidates.push(dir.join(CONF_FILE_NAME));
        }
        candidates
    }

    /// Departments workbook locations, preferred first.
    pub fn departments_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = &self.home_dir {
            candidates.push(dir.join(CONF_DEPARTMENTS_FILE_NAME));
        }
        candidates.push(self.system_dir.join(CONF_DEPARTMENTS_FILE_NAME));
        candidates
    }
}

impl Config {
    /// Load configuration from the standard locations and the environment.
    pub fn from_env(departments_override: Option<PathBuf>) -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::load(&ConfigPaths::discover(), departments_override)
    }

    /// Load configuration from `paths`; `departments_override` wins over every
    /// other source for the workbook location.
    pub fn load(paths: &ConfigPaths, departments_override: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with_env(paths, departments_override, None)
    }

    /// Like [`Config::load`], reading `UOA_*` variables from `env_vars` instead of
    /// the process environment when given.
    pub fn load_with_env(
        paths: &ConfigPaths,
        departments_override: Option<PathBuf>,
        env_vars: Option<config::Map<String, String>>,
    ) -> AppResult<Self> {
        let mut builder = config::Config::builder();
        for candidate in paths.config_candidates() {
            tracing::debug!(path = %candidate.display(), "Config candidate");
            builder = builder.add_source(
                config::File::from(candidate)
                    .format(config::FileFormat::Ini)
                    .required(false),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env_vars),
        );

        let settings: FileSettings = builder.build()?.try_deserialize()?;

        let defaults = LdapConfig::default();
        let ldap = LdapConfig {
            url: settings.ldap.url.unwrap_or(defaults.url),
            base_dn: settings.ldap.base_dn.unwrap_or(defaults.base_dn),
            username: settings.ldap.username.filter(|s| !s.is_empty()),
            password: settings.ldap.password.filter(|s| !s.is_empty()),
            page_size: settings.ldap.page_size.unwrap_or(defaults.page_size),
            accept_invalid_certs: settings
                .ldap
                .accept_invalid_certs
                .unwrap_or(defaults.accept_invalid_certs),
        };

        let departments_file = match departments_override.or(settings.departments_file) {
            Some(path) => path,
            None => find_departments_file(paths)?,
        };

        let config = Config {
            ldap,
            departments_file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(self.ldap.url.starts_with("ldap://") || self.ldap.url.starts_with("ldaps://")) {
            return Err(AppError::Config(format!(
                "LDAP url must start with ldap:// or ldaps://, got '{}'",
                self.ldap.url
            )));
        }

        if self.ldap.base_dn.trim().is_empty() {
            return Err(AppError::Config("LDAP base DN must not be empty".to_string()));
        }

        if self.ldap.page_size <= 0 {
            return Err(AppError::Config(format!(
                "LDAP page size must be positive, got {}",
                self.ldap.page_size
            )));
        }

        Ok(())
    }
}

fn find_departments_file(paths: &ConfigPaths) -> AppResult<PathBuf> {
    let candidates = paths.departments_candidates();
    candidates
        .iter()
        .find(|path| Path::new(path).exists())
        .cloned()
        .ok_or_else(|| {
            let locations: Vec<String> = candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            AppError::Config(format!(
                "No groups file found. Please copy it to either: {}",
                locations.join(" or ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Load with an empty environment so ambient `UOA_*` variables do not leak in.
    fn load(paths: &ConfigPaths, departments: Option<PathBuf>) -> AppResult<Config> {
        Config::load_with_env(paths, departments, env(&[]))
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_config_candidates_order() {
        let paths = ConfigPaths {
            system_dir: PathBuf::from("/etc/uoa-groups"),
            home_dir: Some(PathBuf::from("/home/ada/.uoa-groups")),
            sudo_user_dir: Some(PathBuf::from("/home/bob/.uoa-groups")),
        };
        assert_eq!(
            paths.config_candidates(),
            vec![
                PathBuf::from("/etc/uoa-groups/config"),
                PathBuf::from("/home/bob/.uoa-groups/config"),
                PathBuf::from("/home/ada/.uoa-groups/config"),
            ]
        );
        assert_eq!(
            paths.departments_candidates(),
            vec![
                PathBuf::from("/home/ada/.uoa-groups/departments.xlsx"),
                PathBuf::from("/etc/uoa-groups/departments.xlsx"),
            ]
        );
    }

    #[test]
    fn test_missing_departments_file_is_config_error() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        let paths = ConfigPaths::new(sys.path(), Some(home.path().to_path_buf()));

        let err = load(&paths, None).unwrap_err();
        match err {
            AppError::Config(msg) => {
                assert!(msg.starts_with("No groups file found"));
                assert!(msg.contains("departments.xlsx"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_home_departments_file_preferred_over_system() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        write(&sys.path().join("departments.xlsx"), "");
        write(&home.path().join("departments.xlsx"), "");
        let paths = ConfigPaths::new(sys.path(), Some(home.path().to_path_buf()));

        let config = load(&paths, None).unwrap();
        assert_eq!(config.departments_file, home.path().join("departments.xlsx"));
    }

    #[test]
    fn test_departments_override_wins() {
        let sys = tempdir().unwrap();
        let paths = ConfigPaths::new(sys.path(), None);
        let config = load(&paths, Some(PathBuf::from("/tmp/custom.xlsx"))).unwrap();
        assert_eq!(config.departments_file, PathBuf::from("/tmp/custom.xlsx"));
        assert_eq!(config.ldap.url, DEFAULT_LDAP_URL);
        assert_eq!(config.ldap.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_ini_files_layer_home_over_system() {
        let sys = tempdir().unwrap();
        let home = tempdir().unwrap();
        write(
            &sys.path().join("config"),
            "[LDAP]\nusername = system-user\npassword = system-pass\nurl = ldaps://ldap.example.org\n",
        );
        write(&home.path().join("config"), "[LDAP]\nusername = home-user\n");
        let paths = ConfigPaths::new(sys.path(), Some(home.path().to_path_buf()));

        let config = load(&paths, Some(PathBuf::from("departments.xlsx"))).unwrap();
        assert_eq!(config.ldap.username.as_deref(), Some("home-user"));
        assert_eq!(config.ldap.password.as_deref(), Some("system-pass"));
        assert_eq!(config.ldap.url, "ldaps://ldap.example.org");
    }

    #[test]
    fn test_environment_overrides_files() {
        let sys = tempdir().unwrap();
        write(
            &sys.path().join("config"),
            "[LDAP]\nusername = file-user\npassword = file-pass\n",
        );
        let paths = ConfigPaths::new(sys.path(), None);

        let config = Config::load_with_env(
            &paths,
            None,
            env(&[
                ("UOA_LDAP__URL", "ldap://ldap.example.org"),
                ("UOA_LDAP__USERNAME", "env-user"),
                ("UOA_LDAP__PASSWORD", "env-pass"),
                ("UOA_LDAP__BASE_DN", "ou=Staff,dc=example,dc=org"),
                ("UOA_LDAP__PAGE_SIZE", "250"),
                ("UOA_LDAP__ACCEPT_INVALID_CERTS", "false"),
                ("UOA_DEPARTMENTS_FILE", "/tmp/env.xlsx"),
                ("OTHER_LDAP__USERNAME", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.ldap.url, "ldap://ldap.example.org");
        assert_eq!(config.ldap.username.as_deref(), Some("env-user"));
        assert_eq!(config.ldap.password.as_deref(), Some("env-pass"));
        assert_eq!(config.ldap.base_dn, "ou=Staff,dc=example,dc=org");
        assert_eq!(config.ldap.page_size, 250);
        assert!(!config.ldap.accept_invalid_certs);
        assert_eq!(config.departments_file, PathBuf::from("/tmp/env.xlsx"));
    }

    #[test]
    fn test_departments_override_beats_environment() {
        let sys = tempdir().unwrap();
        let paths = ConfigPaths::new(sys.path(), None);
        let config = Config::load_with_env(
            &paths,
            Some(PathBuf::from("/tmp/cli.xlsx")),
            env(&[("UOA_DEPARTMENTS_FILE", "/tmp/env.xlsx")]),
        )
        .unwrap();
        assert_eq!(config.departments_file, PathBuf::from("/tmp/cli.xlsx"));
    }

    #[test]
    fn test_sudo_user_directory() {
        let paths = ConfigPaths::for_user(
            Some(PathBuf::from("/root")),
            Some("ada".to_string()),
        );
        assert_eq!(paths.system_dir, PathBuf::from("/etc/uoa-groups"));
        assert_eq!(paths.home_dir, Some(PathBuf::from("/root/.uoa-groups")));
        assert_eq!(
            paths.sudo_user_dir,
            Some(PathBuf::from("/home/ada/.uoa-groups"))
        );
        assert_eq!(
            paths.config_candidates(),
            vec![
                PathBuf::from("/etc/uoa-groups/config"),
                PathBuf::from("/home/ada/.uoa-groups/config"),
                PathBuf::from("/root/.uoa-groups/config"),
            ]
        );
    }

    #[test]
    fn test_sudo_user_directory_skipped_when_same_as_home() {
        let paths = ConfigPaths::for_user(
            Some(PathBuf::from("/home/ada")),
            Some("ada".to_string()),
        );
        assert_eq!(paths.sudo_user_dir, None);

        let paths = ConfigPaths::for_user(Some(PathBuf::from("/root")), Some(String::new()));
        assert_eq!(paths.sudo_user_dir, None);

        let paths = ConfigPaths::for_user(None, None);
        assert_eq!(paths.home_dir, None);
        assert_eq!(paths.config_candidates(), vec![PathBuf::from("/etc/uoa-groups/config")]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config {
            ldap: LdapConfig::default(),
            departments_file: PathBuf::from("departments.xlsx"),
        };
        assert!(config.validate().is_ok());

        config.ldap.url = "http://example.org".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.ldap.url = DEFAULT_LDAP_URL.to_string();
        config.ldap.page_size = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let ldap = LdapConfig {
            password: Some("hunter2".to_string()),
            ..LdapConfig::default()
        };
        let debug = format!("{:?}", ldap);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
