//! watch 订阅配置。
//!
//! # 教案式说明
//! - **意图 (Why)**：不同 watcher 只关心部分命名空间（例如地址索引器只订阅 `address`），
//!   订阅集合以 TOML 声明，避免在代码中硬编码；
//! - **契约 (What)**：缺省订阅全部命名空间、非严格模式；空订阅列表视为配置错误。
//!
//! ```toml
//! namespaces = ["config", "address", "dhcp-lease"]
//! strict = true
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::namespace::Namespace;

/// 配置加载错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid watch configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("watch configuration subscribes to no namespace")]
    EmptySubscription,
}

/// 分发器订阅配置。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// 订阅的命名空间；重复项会被忽略。
    pub namespaces: Vec<Namespace>,
    /// 为 `true` 时，批量分发遇到首个畸形键即中止。
    pub strict: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            namespaces: Namespace::ALL.to_vec(),
            strict: false,
        }
    }
}

impl WatchConfig {
    /// 仅订阅给定命名空间。
    pub fn only(namespaces: impl IntoIterator<Item = Namespace>) -> Self {
        Self {
            namespaces: namespaces.into_iter().collect(),
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 从 TOML 文本加载并校验配置。
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: WatchConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespaces.is_empty() {
            return Err(ConfigError::EmptySubscription);
        }
        Ok(())
    }

    pub fn subscribes(&self, namespace: Namespace) -> bool {
        self.namespaces.contains(&namespace)
    }
}
