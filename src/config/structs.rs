use serde::{Deserialize, Serialize};

use crate::errors::{ReflinkerError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量、对外地址
/// - storage: 记录存储后端与数据目录
/// - shortener: 短码长度、直接访问标记
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：RL，分隔符：__
    /// 示例：RL__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 RL，分隔符 __
            .add_source(
                Environment::with_prefix("RL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ReflinkerError::config(format!("Failed to build config: {}", e)))?;

        settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| ReflinkerError::config(format!("Failed to deserialize config: {}", e)))
    }

    /// 启动前校验配置
    pub fn validate(&self) -> Result<()> {
        self.storage.backend_kind()?;
        if self.shortener.code_length == 0 {
            return Err(ReflinkerError::config("shortener.code_length must be > 0"));
        }
        if self.shortener.direct_referrer.trim().is_empty() {
            return Err(ReflinkerError::config(
                "shortener.direct_referrer must not be empty",
            ));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置（默认值）
    pub fn generate_sample_config() -> Result<String> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| ReflinkerError::config(format!("Failed to render sample config: {}", e)))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 生成短链接时使用的对外地址，未设置时从请求推导
    #[serde(default)]
    pub public_base_url: Option<String>,
}

/// 记录存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    File,
    Memory,
}

impl std::str::FromStr for StorageBackendKind {
    type Err = ReflinkerError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            _ => Err(ReflinkerError::config(format!(
                "Invalid storage backend: '{}'. Valid: file, memory",
                s
            ))),
        }
    }
}

impl std::fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl StorageConfig {
    pub fn backend_kind(&self) -> Result<StorageBackendKind> {
        self.backend.parse()
    }
}

/// 短链接生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// 没有 Referer 时记录的来源标记
    #[serde(default = "default_direct_referrer")]
    pub direct_referrer: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_storage_backend() -> String {
    "file".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_code_length() -> usize {
    8
}

fn default_direct_referrer() -> String {
    "Direct".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            public_base_url: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            direct_referrer: default_direct_referrer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend_kind().unwrap(), StorageBackendKind::File);
        assert_eq!(config.shortener.code_length, 8);
        assert_eq!(config.shortener.direct_referrer, "Direct");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(
            "MEMORY".parse::<StorageBackendKind>().unwrap(),
            StorageBackendKind::Memory
        );
        assert!("sled".parse::<StorageBackendKind>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_code_length() {
        let mut config = StaticConfig::default();
        config.shortener.code_length = 0;
        assert!(matches!(config.validate(), Err(ReflinkerError::Config(_))));
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config().unwrap();
        assert!(sample.contains("[storage]"));
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.shortener.code_length, 8);
        assert_eq!(parsed.storage.data_dir, "data");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str("[storage]\nbackend = \"memory\"\n").unwrap();
        assert_eq!(parsed.storage.backend, "memory");
        assert_eq!(parsed.storage.data_dir, "data");
        assert_eq!(parsed.server.host, "127.0.0.1");
    }
}
