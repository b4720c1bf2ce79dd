//! 配置管理模块
//!
//! 提供资源系统配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! 资源池容量、标签栈深度和注册表容量在容器创建时一次性确定，
//! 运行期间不会扩容。超出任何一个固定容量都被视为配置错误。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [resources]
//! mesh_pool_size = 128
//! shader_pool_size = 128
//! texture_pool_size = 128
//! pipeline_pool_size = 128
//! render_pass_pool_size = 16
//! label_stack_capacity = 256
//! registry_capacity = 1024
//!
//! [graphics]
//! backend = "headless"  # 或 "null"
//! memory_budget_mb = 256
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};
use crate::resource::ResourceKind;

/// 单个资源池允许的最大槽位数
pub const MAX_POOL_SIZE: usize = 65536;

/// 设备内存预算上限 (MB)
pub const MAX_MEMORY_BUDGET_MB: u64 = 1 << 20;

/// 资源系统配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 资源容器配置
    #[serde(default)]
    pub resources: ResourceConfig,

    /// 图形后端配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 资源容器配置
///
/// 容器的全部固定容量都来自这里。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// 网格池槽位数
    #[serde(default = "default_pool_size")]
    pub mesh_pool_size: usize,

    /// 着色器池槽位数
    #[serde(default = "default_pool_size")]
    pub shader_pool_size: usize,

    /// 纹理池槽位数
    #[serde(default = "default_pool_size")]
    pub texture_pool_size: usize,

    /// 管线池槽位数
    #[serde(default = "default_pool_size")]
    pub pipeline_pool_size: usize,

    /// 渲染通道池槽位数
    #[serde(default = "default_render_pass_pool_size")]
    pub render_pass_pool_size: usize,

    /// 标签栈最大深度（包含栈底的默认标签）
    #[serde(default = "default_label_stack_capacity")]
    pub label_stack_capacity: usize,

    /// 注册表最多容纳的条目数
    #[serde(default = "default_registry_capacity")]
    pub registry_capacity: usize,
}

/// 图形后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 图形后端选择
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// 无头后端模拟的显存预算（MB）
    #[serde(default = "default_memory_budget_mb")]
    pub memory_budget_mb: u64,
}

/// 图形后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 空后端：所有资源创建都立即成功
    Null,
    /// 无头后端：模拟显存预算和参数校验
    Headless,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_pool_size() -> usize { 128 }
fn default_render_pass_pool_size() -> usize { 16 }
fn default_label_stack_capacity() -> usize { 256 }
fn default_registry_capacity() -> usize { 1024 }
fn default_backend() -> BackendKind { BackendKind::Headless }
fn default_memory_budget_mb() -> u64 { 256 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "dist_resource.log".to_string() }

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            mesh_pool_size: default_pool_size(),
            shader_pool_size: default_pool_size(),
            texture_pool_size: default_pool_size(),
            pipeline_pool_size: default_pool_size(),
            render_pass_pool_size: default_render_pass_pool_size(),
            label_stack_capacity: default_label_stack_capacity(),
            registry_capacity: default_registry_capacity(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            memory_budget_mb: default_memory_budget_mb(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl ResourceConfig {
    /// 获取某种资源的池容量
    pub fn pool_size(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Mesh => self.mesh_pool_size,
            ResourceKind::Shader => self.shader_pool_size,
            ResourceKind::Texture => self.texture_pool_size,
            ResourceKind::Pipeline => self.pipeline_pool_size,
            ResourceKind::RenderPass => self.render_pass_pool_size,
        }
    }

    /// 将所有资源池设置为同一容量
    pub fn set_all_pool_sizes(&mut self, size: usize) {
        self.mesh_pool_size = size;
        self.shader_pool_size = size;
        self.texture_pool_size = size;
        self.pipeline_pool_size = size;
        self.render_pass_pool_size = size;
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Config` 实例，失败返回错误
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use dist_resource::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), dist_resource::core::DistResourceError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// # 说明
    ///
    /// 支持的参数：
    /// - `--null`: 使用空后端
    /// - `--headless`: 使用无头后端
    /// - `--pool-size <value>`: 设置所有资源池的容量
    /// - `--budget-mb <value>`: 设置显存预算
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if args.iter().any(|a| a == "--null") {
            self.graphics.backend = BackendKind::Null;
        }

        if args.iter().any(|a| a == "--headless") {
            self.graphics.backend = BackendKind::Headless;
        }

        if let Some(size) = parse_flag_value::<usize>(&args, "--pool-size") {
            self.resources.set_all_pool_sizes(size);
        }

        if let Some(budget) = parse_flag_value::<u64>(&args, "--budget-mb") {
            self.graphics.memory_budget_mb = budget;
        }
    }

    /// 验证配置的有效性
    ///
    /// # 返回值
    ///
    /// 配置有效返回 `Ok(())`，否则返回错误
    pub fn validate(&self) -> Result<()> {
        for kind in ResourceKind::ALL {
            let size = self.resources.pool_size(kind);
            if size == 0 || size > MAX_POOL_SIZE {
                return Err(ConfigError::InvalidValue {
                    field: format!("resources.{}_pool_size", kind.config_key()),
                    reason: format!("Pool size must be between 1 and {}", MAX_POOL_SIZE),
                }.into());
            }
        }

        if self.resources.label_stack_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resources.label_stack_capacity".to_string(),
                reason: "Label stack capacity must be greater than 0".to_string(),
            }.into());
        }

        if self.resources.registry_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resources.registry_capacity".to_string(),
                reason: "Registry capacity must be greater than 0".to_string(),
            }.into());
        }

        if self.graphics.memory_budget_mb == 0 || self.graphics.memory_budget_mb > MAX_MEMORY_BUDGET_MB {
            return Err(ConfigError::InvalidValue {
                field: "graphics.memory_budget_mb".to_string(),
                reason: format!("Memory budget must be between 1 and {} MB", MAX_MEMORY_BUDGET_MB),
            }.into());
        }

        Ok(())
    }
}

fn parse_flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1)?.parse().ok()
}

impl BackendKind {
    /// 获取后端名称
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Null => "Null",
            BackendKind::Headless => "Headless",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.resources.mesh_pool_size, 128);
        assert_eq!(config.resources.render_pass_pool_size, 16);
        assert_eq!(config.resources.label_stack_capacity, 256);
        assert_eq!(config.resources.registry_capacity, 1024);
        assert_eq!(config.graphics.backend, BackendKind::Headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.resources.texture_pool_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.resources.shader_pool_size = MAX_POOL_SIZE + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.resources.label_stack_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.memory_budget_mb = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.memory_budget_mb = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("dist_resource_config_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.resources.texture_pool_size = 48;
        config.graphics.backend = BackendKind::Null;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.resources.texture_pool_size, 48);
        assert_eq!(loaded.graphics.backend, BackendKind::Null);
        assert_eq!(loaded.logging.level, config.logging.level);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            "[resources]\nmesh_pool_size = 8\n\n[graphics]\nbackend = \"null\"\n",
        )
        .unwrap();

        assert_eq!(config.resources.mesh_pool_size, 8);
        assert_eq!(config.resources.texture_pool_size, 128);
        assert_eq!(config.graphics.backend, BackendKind::Null);
        assert_eq!(config.graphics.memory_budget_mb, 256);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["app", "--null", "--pool-size", "32", "--budget-mb", "64"]);

        assert_eq!(config.graphics.backend, BackendKind::Null);
        for kind in ResourceKind::ALL {
            assert_eq!(config.resources.pool_size(kind), 32);
        }
        assert_eq!(config.graphics.memory_budget_mb, 64);

        // 非法数值保持原值
        config.apply_args(["app", "--pool-size", "many"]);
        assert_eq!(config.resources.mesh_pool_size, 32);
    }
}
