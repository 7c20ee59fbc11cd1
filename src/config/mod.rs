use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    /// Defaults, then the rc file at `config_path`, then the environment.
    pub fn load_from(config_path: &Path) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self {
            inner: map,
            config_path: config_path.to_path_buf(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "RSCRIPT_PATH",
        "RINTERFACE_TIMEOUT",
        "RINTERFACE_TEMP_DIR",
        "RINTERFACE_KEEP_TEMP",
        "RINTERFACE_WORK_DIR",
    ];

    KEYS.contains(&k) || k.starts_with("RINTERFACE_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("rinterface").join(".rinterfacerc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("RSCRIPT_PATH".into(), "Rscript".into());
    m.insert("RINTERFACE_TIMEOUT".into(), "0".into());
    m.insert(
        "RINTERFACE_TEMP_DIR".into(),
        env::temp_dir().to_string_lossy().into_owned(),
    );
    m.insert("RINTERFACE_KEEP_TEMP".into(), "false".into());
    m
}

/// Typed interpreter settings derived from [`Config`].
#[derive(Debug, Clone)]
pub struct RInterfaceConfig {
    /// Interpreter binary, `Rscript` unless overridden.
    pub rscript: PathBuf,
    /// Working directory of the interpreter; inherited when `None`.
    pub work_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    /// Parent directory for per-run temp directories.
    pub temp_root: PathBuf,
    /// Leave the run's temp directory on disk after it finishes.
    pub keep_temp: bool,
}

impl Default for RInterfaceConfig {
    fn default() -> Self {
        Self {
            rscript: PathBuf::from("Rscript"),
            work_dir: None,
            timeout: None,
            temp_root: env::temp_dir(),
            keep_temp: false,
        }
    }
}

impl RInterfaceConfig {
    pub fn from_config(cfg: &Config) -> Self {
        let defaults = Self::default();
        Self {
            rscript: cfg.get_path("RSCRIPT_PATH").unwrap_or(defaults.rscript),
            work_dir: cfg.get_path("RINTERFACE_WORK_DIR"),
            timeout: cfg
                .get_u64("RINTERFACE_TIMEOUT")
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            temp_root: cfg.get_path("RINTERFACE_TEMP_DIR").unwrap_or(defaults.temp_root),
            keep_temp: cfg.get_bool("RINTERFACE_KEEP_TEMP"),
        }
    }

    pub fn with_rscript(mut self, rscript: impl Into<PathBuf>) -> Self {
        self.rscript = rscript.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn with_temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = dir.into();
        self
    }

    pub fn with_keep_temp(mut self, keep: bool) -> Self {
        self.keep_temp = keep;
        self
    }
}
