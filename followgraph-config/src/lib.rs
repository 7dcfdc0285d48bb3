//! Run configuration for followgraph: defaults, an optional YAML file, and
//! `FOLLOWGRAPH__`-prefixed environment overrides, plus dotenv credential loading.
//!
//! Precedence, lowest to highest: built-in defaults, `followgraph.yaml`, environment.
//! Path settings and `api_base` may reference `${VAR}`; references are expanded after merging.
use config::{Config, Environment, File};
use followgraph_common::{FieldSet, SnapshotPolicy, UserField};
pub use followgraph_common::{MAX_FOLLOWING_PAGE, MAX_LOOKUP_BATCH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod credentials;

pub use credentials::load_credentials;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read credentials from {path}: {message}")]
    Credentials { path: String, message: String },
}

/// Everything the orchestration needs to run once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory holding the seed list, raw snapshot, and report.
    pub data_dir: PathBuf,
    pub seeds_file: PathBuf,
    pub raw_file: PathBuf,
    pub report_file: PathBuf,
    /// Dotenv file with provider credentials (resolved against the working directory).
    pub credentials_file: PathBuf,
    /// Optional attributes collected per followee on top of username and name.
    pub user_fields: FieldSet,
    pub save_raw: bool,
    pub snapshot_policy: SnapshotPolicy,
    pub lookup_batch_size: usize,
    pub following_page_size: u32,
    pub api_base: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            seeds_file: PathBuf::from("usernames.csv"),
            raw_file: PathBuf::from("raw.json"),
            report_file: PathBuf::from("results.csv"),
            credentials_file: PathBuf::from("config/.env"),
            user_fields: FieldSet::new([
                UserField::Description,
                UserField::PublicMetrics,
                UserField::Verified,
            ]),
            save_raw: true,
            snapshot_policy: SnapshotPolicy::Skip,
            lookup_batch_size: MAX_LOOKUP_BATCH,
            following_page_size: MAX_FOLLOWING_PAGE,
            api_base: "https://api.twitter.com".into(),
        }
    }
}

impl RunConfig {
    fn in_data_dir(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }

    pub fn seeds_path(&self) -> PathBuf {
        self.in_data_dir(&self.seeds_file)
    }

    pub fn raw_path(&self) -> PathBuf {
        self.in_data_dir(&self.raw_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.in_data_dir(&self.report_file)
    }

    /// Reject limits the provider would refuse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LOOKUP_BATCH).contains(&self.lookup_batch_size) {
            return Err(ConfigError::Invalid(format!(
                "lookup_batch_size must be within 1..={MAX_LOOKUP_BATCH}, got {}",
                self.lookup_batch_size
            )));
        }
        if !(1..=MAX_FOLLOWING_PAGE).contains(&self.following_page_size) {
            return Err(ConfigError::Invalid(format!(
                "following_page_size must be within 1..={MAX_FOLLOWING_PAGE}, got {}",
                self.following_page_size
            )));
        }
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base must not be empty".into()));
        }
        Ok(())
    }
}

/// Expand `${VAR}` references, re-expanding until stable or the depth cap is hit.
/// Unknown variables are left as written.
fn expand_env_str(raw: &str) -> String {
    let mut cur = raw.to_string();
    if !cur.contains('$') {
        return cur;
    }
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let expanded = match shellexpand::env(&cur) {
            Ok(cow) => cow.into_owned(),
            Err(_) => cur.clone(),
        };
        if expanded == cur {
            break;
        }
        cur = expanded;
    }
    cur
}

fn expand_env_path(path: &mut PathBuf) {
    if let Some(s) = path.to_str() {
        *path = PathBuf::from(expand_env_str(s));
    }
}

impl RunConfig {
    /// Expand `${VAR}` references in the path and URL settings.
    fn expand_env(&mut self) {
        expand_env_path(&mut self.data_dir);
        expand_env_path(&mut self.seeds_file);
        expand_env_path(&mut self.raw_file);
        expand_env_path(&mut self.report_file);
        expand_env_path(&mut self.credentials_file);
        self.api_base = expand_env_str(&self.api_base);
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct RunConfigLoader {
    files: Vec<(PathBuf, bool)>,
    inline: Vec<String>,
}

impl Default for RunConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RunConfigLoader {
    /// Start from built-in defaults; `FOLLOWGRAPH__` env overrides are always applied last.
    ///
    /// ```
    /// use followgraph_config::RunConfigLoader;
    ///
    /// let cfg = RunConfigLoader::new()
    ///     .with_yaml_str("lookup_batch_size: 50\nsnapshot_policy: overwrite")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.lookup_batch_size, 50);
    /// assert_eq!(cfg.following_page_size, 1000);
    /// ```
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            inline: Vec::new(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), true));
        self
    }

    /// Attach a file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), false));
        self
    }

    /// Merge an inline YAML snippet (tests, embedded defaults).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.inline.push(yaml.to_string());
        self
    }

    /// Merge sources, expand `${VAR}` placeholders, deserialize and validate.
    pub fn load(self) -> Result<RunConfig, ConfigError> {
        let mut builder = Config::builder();
        for (path, required) in &self.files {
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }
        for yaml in &self.inline {
            builder = builder.add_source(File::from_str(yaml, config::FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix("FOLLOWGRAPH")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("user_fields"),
        );

        let cfg = builder.build()?;
        // Typed deserialization lets string fields accept numeric-looking values.
        let mut typed: RunConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        typed.expand_env();
        typed.validate()?;
        Ok(typed)
    }
}
