//! 资源定位符
//!
//! 定位符是资源的逻辑身份：位置字符串加一个签名。
//! 位置非空的定位符是“共享”的，参与创建去重；
//! 位置为空的定位符每次都创建新资源。

use std::fmt;

/// 资源定位符
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    location: Option<String>,
    signature: u32,
}

impl Locator {
    /// 默认签名
    pub const DEFAULT_SIGNATURE: u32 = u32::MAX;

    /// 以位置字符串创建共享定位符
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            location: if location.is_empty() { None } else { Some(location) },
            signature: Self::DEFAULT_SIGNATURE,
        }
    }

    /// 同一位置的不同变体使用不同签名区分
    pub fn with_signature(location: impl Into<String>, signature: u32) -> Self {
        Self { signature, ..Self::new(location) }
    }

    /// 不参与去重的定位符
    pub fn non_shared() -> Self {
        Self {
            location: None,
            signature: Self::DEFAULT_SIGNATURE,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.location.is_some()
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn signature(&self) -> u32 {
        self.signature
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::non_shared()
    }
}

impl From<&str> for Locator {
    fn from(location: &str) -> Self {
        Self::new(location)
    }
}

impl From<String> for Locator {
    fn from(location: String) -> Self {
        Self::new(location)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.location, self.signature) {
            (None, _) => f.write_str("<non-shared>"),
            (Some(loc), Self::DEFAULT_SIGNATURE) => f.write_str(loc),
            (Some(loc), sig) => write!(f, "{}@{}", loc, sig),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_locator() {
        let loc = Locator::new("cube");
        assert!(loc.is_shared());
        assert_eq!(loc, Locator::from("cube"));
        assert_ne!(loc, Locator::with_signature("cube", 7));
        assert_eq!(Locator::with_signature("cube", 7).to_string(), "cube@7");
    }

    #[test]
    fn test_empty_location_is_non_shared() {
        assert!(!Locator::new("").is_shared());
        assert!(!Locator::default().is_shared());
        assert_eq!(Locator::non_shared().location(), "");
    }
}
