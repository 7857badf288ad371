//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 键空间的全部函数都是纯函数，失败只取决于输入，因此错误均为可恢复的普通结果，不存在重试语义；
//! - 区分“键不属于本命名空间”与“前缀匹配但后缀无法分解”，前者对 watch 分发器意味着“不是我的，跳过”。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`；
//! - [`KeyError::code`] 提供 `<领域>.<语义>` 形式的稳定错误码，便于日志聚合。

use thiserror::Error;

use crate::namespace::Namespace;

/// 键空间操作的结果别名。
pub type Result<T, E = KeyError> = core::result::Result<T, E>;

/// 稳定错误码。
pub mod codes {
    /// 键不属于被查询的命名空间。
    pub const PREFIX_MISMATCH: &str = "keyspace.prefix_mismatch";
    /// 前缀匹配，但后缀无法分解为预期分量。
    pub const MALFORMED_SUFFIX: &str = "keyspace.malformed_suffix";
    /// 构建地址键时传入的地址不是 `ip/mask` 形式。
    pub const INVALID_ADDRESS: &str = "keyspace.invalid_address";
}

/// 错误大类，供调用方做粗粒度分支。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyErrorKind {
    PrefixMismatch,
    MalformedSuffix,
    InvalidAddress,
}

/// 后缀缺陷的细分原因。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuffixDefect {
    /// 地址键后缀分量不足三段（接口名 + ip + mask）。
    TooFewComponents { found: usize },
    /// 末尾两段无法组成合法网络。
    InvalidNetwork { candidate: String },
    /// 该命名空间的后缀形态与调用的解析入口不符。
    ShapeMismatch,
}

impl core::fmt::Display for SuffixDefect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooFewComponents { found } => {
                write!(f, "expected at least 3 components (name/ip/mask), found {found}")
            }
            Self::InvalidNetwork { candidate } => {
                write!(f, "`{candidate}` is not a valid ip/mask network")
            }
            Self::ShapeMismatch => f.write_str("suffix shape does not match the requested parser"),
        }
    }
}

/// 键空间错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把解析失败显式化为带标签的结果，而不是 panic 或静默截断；
/// - **契约 (What)**：
///   - `PrefixMismatch`：键缺少被查询命名空间的前缀（或属于前缀更长的其它命名空间）；
///   - `MalformedSuffix`：前缀匹配但后缀分解失败；
///   - `InvalidAddress`：地址键构建器收到的地址不含恰好一个分隔符；
/// - **设计权衡 (Trade-offs)**：变体携带完整键的 `String` 副本，牺牲少量分配换取可读诊断。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("key `{key}` does not belong to the `{expected}` namespace")]
    PrefixMismatch { expected: Namespace, key: String },

    #[error("malformed `{namespace}` key `{key}`: {defect}")]
    MalformedSuffix {
        namespace: Namespace,
        key: String,
        defect: SuffixDefect,
    },

    #[error("address `{address}` must have the form `ip/mask`")]
    InvalidAddress { address: String },
}

impl KeyError {
    /// 返回错误大类。
    pub fn kind(&self) -> KeyErrorKind {
        match self {
            Self::PrefixMismatch { .. } => KeyErrorKind::PrefixMismatch,
            Self::MalformedSuffix { .. } => KeyErrorKind::MalformedSuffix,
            Self::InvalidAddress { .. } => KeyErrorKind::InvalidAddress,
        }
    }

    /// 返回稳定错误码，见 [`codes`]。
    pub fn code(&self) -> &'static str {
        match self.kind() {
            KeyErrorKind::PrefixMismatch => codes::PREFIX_MISMATCH,
            KeyErrorKind::MalformedSuffix => codes::MALFORMED_SUFFIX,
            KeyErrorKind::InvalidAddress => codes::INVALID_ADDRESS,
        }
    }

    /// 键是否“不属于本命名空间”。分发器据此跳过而非上报。
    #[inline]
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::PrefixMismatch { .. })
    }

    pub(crate) fn malformed(namespace: Namespace, key: &str, defect: SuffixDefect) -> Self {
        Self::MalformedSuffix {
            namespace,
            key: key.to_owned(),
            defect,
        }
    }
}
