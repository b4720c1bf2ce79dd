//! 错误处理模块
//!
//! 定义了资源系统中可恢复的错误类型。
//!
//! # 错误分类
//!
//! - 可恢复错误（配置文件读写、工厂内部的后端构建、加载源失败）使用 `Result` 传递
//! - 致命错误（资源池耗尽、标签栈下溢、非法的资源类型分发）直接 panic，
//!   它们只会由容量配置或调用方式的错误触发
//! - 资源级失败（例如着色器编译失败）记录为终态 `ResourceState::Failed`，
//!   不会通过 `Result` 向上传播

use std::fmt;

/// 资源系统统一的 Result 类型
pub type Result<T> = std::result::Result<T, DistResourceError>;

/// 资源系统的错误类型
#[derive(Debug)]
pub enum DistResourceError {
    /// 配置错误
    Config(ConfigError),

    /// 图形后端错误（只在工厂内部出现，最终会被折算为 `Failed` 状态）
    Graphics(GraphicsError),

    /// 异步加载错误
    Load(LoadError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形后端相关的错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 着色器编译失败
    ShaderCompilation(String),

    /// 设备内存不足
    OutOfMemory { requested: u64, available: u64 },

    /// 创建参数与提供的数据不匹配
    InvalidSetup(String),
}

/// 异步加载相关的错误
#[derive(Debug)]
pub enum LoadError {
    /// 数据源不存在
    SourceNotFound(String),

    /// 读取数据失败
    ReadFailed(String),

    /// 加载已被取消
    Cancelled,

    /// 数据提供方在交付结果之前断开
    Disconnected,
}

impl fmt::Display for DistResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistResourceError::Config(e) => write!(f, "Configuration error: {}", e),
            DistResourceError::Graphics(e) => write!(f, "Graphics error: {}", e),
            DistResourceError::Load(e) => write!(f, "Load error: {}", e),
            DistResourceError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            GraphicsError::OutOfMemory { requested, available } => write!(
                f,
                "Out of device memory: requested {} bytes, {} bytes available",
                requested, available
            ),
            GraphicsError::InvalidSetup(msg) => write!(f, "Invalid resource setup: {}", msg),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::SourceNotFound(src) => write!(f, "Load source not found: {}", src),
            LoadError::ReadFailed(msg) => write!(f, "Failed to read load source: {}", msg),
            LoadError::Cancelled => write!(f, "Load was cancelled"),
            LoadError::Disconnected => write!(f, "Load source disconnected before delivering data"),
        }
    }
}

impl std::error::Error for DistResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DistResourceError::Config(e) => Some(e),
            DistResourceError::Graphics(e) => Some(e),
            DistResourceError::Load(e) => Some(e),
            DistResourceError::Io(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}
impl std::error::Error for LoadError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for DistResourceError {
    fn from(err: std::io::Error) -> Self {
        DistResourceError::Io(err)
    }
}

impl From<ConfigError> for DistResourceError {
    fn from(err: ConfigError) -> Self {
        DistResourceError::Config(err)
    }
}

impl From<GraphicsError> for DistResourceError {
    fn from(err: GraphicsError) -> Self {
        DistResourceError::Graphics(err)
    }
}

impl From<LoadError> for DistResourceError {
    fn from(err: LoadError) -> Self {
        DistResourceError::Load(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err: DistResourceError = GraphicsError::OutOfMemory { requested: 512, available: 128 }.into();
        assert_eq!(
            err.to_string(),
            "Graphics error: Out of device memory: requested 512 bytes, 128 bytes available"
        );

        let err: DistResourceError = ConfigError::InvalidValue {
            field: "resources.mesh_pool_size".to_string(),
            reason: "must be greater than 0".to_string(),
        }
        .into();
        assert!(err.to_string().contains("resources.mesh_pool_size"));
    }

    #[test]
    fn test_error_source_chain() {
        let err: DistResourceError = LoadError::Disconnected.into();
        let source = err.source().expect("wrapped error should be exposed as source");
        assert_eq!(source.to_string(), LoadError::Disconnected.to_string());
    }
}
