use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

const USER_CONFIG_DIR: &str = ".config/classmap";
const USER_CONFIG_FILE_NAME: &str = "config.toml";

// 扫描配置
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// 参与扫描的文件扩展名（不含点）
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 跳过的目录名
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// 是否遵循 .gitignore
    #[serde(default = "default_respect_gitignore")]
    pub respect_gitignore: bool,

    /// 并发上限，0 表示使用 CPU 数量
    #[serde(default)]
    pub max_concurrency: usize,

    /// 单文件超时（毫秒），0 表示不限制
    #[serde(default)]
    pub file_timeout_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            respect_gitignore: default_respect_gitignore(),
            max_concurrency: 0,
            file_timeout_ms: 0,
        }
    }
}

impl ScanConfig {
    /// Worker count, resolving `0` to the number of available CPUs.
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency > 0 {
            return self.max_concurrency;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn file_timeout(&self) -> Option<Duration> {
        (self.file_timeout_ms > 0).then(|| Duration::from_millis(self.file_timeout_ms))
    }
}

fn default_extensions() -> Vec<String> {
    vec!["java".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    ["target", "build", "out", "node_modules", ".git"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_respect_gitignore() -> bool {
    true
}

/// 输出格式
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Summary,
}

// 输出配置
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// JSON 是否缩进输出
    #[serde(default)]
    pub pretty: bool,
}

// 扫描配置的部分加载辅助结构体
#[derive(Deserialize, Debug, Default, Clone)]
struct PartialScanConfig {
    #[serde(default)]
    extensions: Option<Vec<String>>,
    #[serde(default)]
    exclude_dirs: Option<Vec<String>>,
    #[serde(default)]
    respect_gitignore: Option<bool>,
    #[serde(default)]
    max_concurrency: Option<usize>,
    #[serde(default)]
    file_timeout_ms: Option<u64>,
}

// 输出配置的部分加载辅助结构体
#[derive(Deserialize, Debug, Default, Clone)]
struct PartialOutputConfig {
    #[serde(default)]
    format: Option<OutputFormat>,
    #[serde(default)]
    pretty: Option<bool>,
}

// 应用总体配置
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

// 部分加载的配置辅助结构体
#[derive(Deserialize, Debug, Default)]
struct PartialAppConfig {
    scan: Option<PartialScanConfig>,
    output: Option<PartialOutputConfig>,
}

impl AppConfig {
    /// 加载配置
    ///
    /// 顺序：显式指定的文件 -> 用户目录下的 config.toml -> 内置默认值。
    /// 显式指定的文件不存在时返回错误；用户目录下的文件不存在则使用默认值。
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            info!("Loading configuration from {:?}", path);
            return Self::load_config_from_file(path);
        }

        match Self::get_user_config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                Self::load_config_from_file(&path)
            }
            _ => {
                debug!("No user configuration found, using defaults");
                Ok(Self::default())
            }
        }
    }

    // 获取用户目录中的配置文件路径
    fn get_user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE_NAME))
    }

    pub fn load_config_from_file(config_path: &Path) -> Result<Self, ConfigError> {
        let config_content = fs::read_to_string(config_path)
            .map_err(|e| ConfigError::FileRead(config_path.to_string_lossy().to_string(), e))?;
        Self::from_toml_str(&config_content, &config_path.to_string_lossy())
    }

    /// Parses TOML text, filling every missing field from the defaults.
    pub fn from_toml_str(content: &str, source_name: &str) -> Result<Self, ConfigError> {
        let partial_config: PartialAppConfig = toml::from_str(content)
            .map_err(|e| ConfigError::TomlParse(source_name.to_string(), e))?;
        Ok(Self::merge(partial_config))
    }

    fn merge(partial_config: PartialAppConfig) -> Self {
        let defaults = ScanConfig::default();
        let partial_scan = partial_config.scan.unwrap_or_default();
        let scan = ScanConfig {
            extensions: partial_scan.extensions.unwrap_or(defaults.extensions),
            exclude_dirs: partial_scan.exclude_dirs.unwrap_or(defaults.exclude_dirs),
            respect_gitignore: partial_scan
                .respect_gitignore
                .unwrap_or(defaults.respect_gitignore),
            max_concurrency: partial_scan
                .max_concurrency
                .unwrap_or(defaults.max_concurrency),
            file_timeout_ms: partial_scan
                .file_timeout_ms
                .unwrap_or(defaults.file_timeout_ms),
        };

        let partial_output = partial_config.output.unwrap_or_default();
        let output = OutputConfig {
            format: partial_output.format.unwrap_or_default(),
            pretty: partial_output.pretty.unwrap_or(false),
        };

        Self { scan, output }
    }
}
