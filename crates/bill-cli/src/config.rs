//! Configuration loading and management.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{(?P<braced>\w+)\}|(?P<bare>\w+))").unwrap());

/// Application configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Billed projects keyed by their identifier.
    #[serde(default, rename = "project")]
    pub projects: BTreeMap<String, ProjectConfig>,
}

/// One billed project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Path to the ledger document. `~` and `$VAR` are expanded.
    #[serde(alias = "storage")]
    pub db: PathBuf,

    /// Hourly rate.
    pub rate: f64,

    /// Display name; defaults to the project identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ProjectConfig {
    /// The ledger path with `~` and environment variables expanded.
    pub fn storage_path(&self) -> PathBuf {
        expand_path(&self.db)
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources override earlier ones: the legacy `~/.bill/config.json`,
    /// the platform config file, `config_path`, then `BILL_*` variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut files = Vec::new();
        if let Some(home) = dirs::home_dir() {
            files.push(home.join(".bill").join("config.json"));
        }
        if let Some(config_dir) = dirs_config_path() {
            files.push(config_dir.join("config.toml"));
        }
        if let Some(path) = config_path {
            files.push(path.to_path_buf());
        }
        Self::from_files(&files)
    }

    /// Merges `files` in order over the defaults, then the environment.
    ///
    /// Missing files are skipped. Files ending in `.json` are read as JSON,
    /// everything else as TOML.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn from_files(files: &[PathBuf]) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        for path in files {
            figment = if is_json(path) {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }

        // Load from environment variables (BILL_PROJECT__<ID>__RATE=...)
        figment = figment.merge(Env::prefixed("BILL_").split("__"));

        figment.extract()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Returns the platform-specific config directory for bill.
///
/// On Linux: `~/.config/bill`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bill"))
}

/// Expands a leading `~` and `$VAR` / `${VAR}` references.
///
/// Unset variables are left as written.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = ENV_VAR_RE.replace_all(&raw, |caps: &Captures<'_>| {
        let name = caps
            .name("braced")
            .or_else(|| caps.name("bare"))
            .map_or("", |m| m.as_str());
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });

    let home = dirs::home_dir();
    match (&*expanded, home) {
        ("~", Some(home)) => home,
        (s, Some(home)) if s.starts_with("~/") => home.join(&s[2..]),
        (s, _) => PathBuf::from(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_dirs_config_path_ends_with_bill() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "bill");
    }

    #[test]
    fn test_default_config_has_no_projects() {
        assert!(Config::default().projects.is_empty());
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::from_files(&[temp.path().join("absent.toml")]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_loads_projects_from_toml() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[project.wrd]
db = "/tmp/wrd.json"
rate = 20

[project.acme]
db = "/tmp/acme.json"
rate = 55.5
name = "Acme Corp"
"#,
        )
        .unwrap();

        let config = Config::from_files(&[path]).unwrap();

        assert_eq!(config.projects.len(), 2);
        let wrd = &config.projects["wrd"];
        assert_eq!(wrd.db, PathBuf::from("/tmp/wrd.json"));
        assert!((wrd.rate - 20.0).abs() < f64::EPSILON);
        assert_eq!(wrd.name, None);
        assert_eq!(config.projects["acme"].name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_loads_legacy_json_layout() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"project": {"wrd": {"storage": "/tmp/wrd.json", "rate": 20}}}"#,
        )
        .unwrap();

        let config = Config::from_files(&[path]).unwrap();
        assert_eq!(config.projects["wrd"].db, PathBuf::from("/tmp/wrd.json"));
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().join("base.toml");
        let local = temp.path().join("local.toml");
        fs::write(&base, "[project.wrd]\ndb = \"/tmp/wrd.json\"\nrate = 20\n").unwrap();
        fs::write(&local, "[project.wrd]\nrate = 30\n").unwrap();

        let config = Config::from_files(&[base, local]).unwrap();
        let wrd = &config.projects["wrd"];
        assert_eq!(wrd.db, PathBuf::from("/tmp/wrd.json"));
        assert!((wrd.rate - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_project_without_rate_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[project.wrd]\ndb = \"/tmp/wrd.json\"\n").unwrap();

        assert!(Config::from_files(&[path]).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[project.wrd\n").unwrap();

        assert!(Config::from_files(&[path]).is_err());
    }

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(
            expand_path(Path::new("/var/lib/bill/wrd.json")),
            PathBuf::from("/var/lib/bill/wrd.json")
        );
    }

    #[test]
    fn test_expand_path_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path(Path::new("~/.bill/wrd.json")), home.join(".bill/wrd.json"));
        assert_eq!(expand_path(Path::new("~")), home);
    }

    #[test]
    fn test_expand_path_variables() {
        let Ok(path_var) = std::env::var("PATH") else {
            return;
        };
        assert_eq!(
            expand_path(Path::new("$PATH/x")),
            PathBuf::from(format!("{path_var}/x"))
        );
        assert_eq!(
            expand_path(Path::new("${PATH}/x")),
            PathBuf::from(format!("{path_var}/x"))
        );
    }

    #[test]
    fn test_expand_path_keeps_unset_variables() {
        assert_eq!(
            expand_path(Path::new("$BILL_SURELY_UNSET_VARIABLE/wrd.json")),
            PathBuf::from("$BILL_SURELY_UNSET_VARIABLE/wrd.json")
        );
    }
}
