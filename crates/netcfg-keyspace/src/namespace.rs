use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KeyError, Result};

/// 键路径分隔符。接口名本身可能包含该字符，解析时不得据此截断接口名。
pub const SEPARATOR: char = '/';

/// 命名空间后缀的固定形态。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuffixShape {
    /// 后缀整体即接口名。
    Name,
    /// `name/ip/mask`：接口名之后固定跟随两段地址分量。
    NameAddress,
}

/// 键空间中的命名空间。
///
/// ## 设计目的（Why）
/// - 将散落的前缀常量收敛为封闭枚举，所有构建/解析逻辑都通过穷举 `match` 分派；
/// - 前缀即跨进程的线上契约：所有 watcher 依赖同一前缀方案，修改前缀必须伴随显式迁移。
///
/// ## 契约定义（What）
/// - 每个变体对应一个常量前缀与一种 [`SuffixShape`]；
/// - `State` 前缀是 `Error` 前缀的前缀，键的归属按**最长前缀**判定，见 [`Namespace::classify`]；
/// - 序列化名称采用 kebab-case（`config`、`dhcp-client` 等），供配置文件引用。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// 接口配置对象。
    Config,
    /// 接口运行状态。
    State,
    /// 接口错误记录。
    Error,
    /// 派生键：接口上已分配的 IP 地址。
    #[serde(rename = "address")]
    AddressDerived,
    /// 派生键：unnumbered 接口关系。
    #[serde(rename = "unnumbered")]
    UnnumberedDerived,
    /// 派生键：已启用 DHCP 客户端的接口。
    #[serde(rename = "dhcp-client")]
    DhcpClientDerived,
    /// DHCP 租约通知。
    #[serde(rename = "dhcp-lease")]
    DhcpLeaseDerived,
}

/// 接口配置前缀。
pub const CONFIG_PREFIX: &str = "vpp/config/v2/interface/";
/// 接口状态前缀。
pub const STATE_PREFIX: &str = "vpp/status/v2/interface/";
/// 接口错误前缀，嵌套在状态前缀之下。
pub const ERROR_PREFIX: &str = "vpp/status/v2/interface/error/";
/// 地址派生键前缀。
pub const ADDRESS_PREFIX: &str = "vpp/interface/address/";
/// unnumbered 派生键前缀。
pub const UNNUMBERED_PREFIX: &str = "vpp/interface/unnumbered/";
/// DHCP 客户端派生键前缀。
pub const DHCP_CLIENT_PREFIX: &str = "vpp/interface/dhcp-client/";
/// DHCP 租约键前缀。
pub const DHCP_LEASE_PREFIX: &str = "vpp/interface/dhcp-lease/";

impl Namespace {
    /// 全部命名空间，顺序与前缀表一致。
    pub const ALL: [Namespace; 7] = [
        Namespace::Config,
        Namespace::State,
        Namespace::Error,
        Namespace::AddressDerived,
        Namespace::UnnumberedDerived,
        Namespace::DhcpClientDerived,
        Namespace::DhcpLeaseDerived,
    ];

    /// 返回命名空间的常量前缀。
    #[inline]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Config => CONFIG_PREFIX,
            Self::State => STATE_PREFIX,
            Self::Error => ERROR_PREFIX,
            Self::AddressDerived => ADDRESS_PREFIX,
            Self::UnnumberedDerived => UNNUMBERED_PREFIX,
            Self::DhcpClientDerived => DHCP_CLIENT_PREFIX,
            Self::DhcpLeaseDerived => DHCP_LEASE_PREFIX,
        }
    }

    /// 返回命名空间后缀形态。
    #[inline]
    pub const fn suffix_shape(self) -> SuffixShape {
        match self {
            Self::AddressDerived => SuffixShape::NameAddress,
            Self::Config
            | Self::State
            | Self::Error
            | Self::UnnumberedDerived
            | Self::DhcpClientDerived
            | Self::DhcpLeaseDerived => SuffixShape::Name,
        }
    }

    /// 稳定的短名称，与 serde 表示一致，用于日志字段与错误信息。
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::State => "state",
            Self::Error => "error",
            Self::AddressDerived => "address",
            Self::UnnumberedDerived => "unnumbered",
            Self::DhcpClientDerived => "dhcp-client",
            Self::DhcpLeaseDerived => "dhcp-lease",
        }
    }

    /// 判定键归属的命名空间。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：`STATE_PREFIX` 同时是 `ERROR_PREFIX` 的前缀，若逐个比对前缀，
    ///   错误键会被状态命名空间“误认领”，破坏命名空间隔离；
    /// - **执行 (How)**：遍历前缀表，保留匹配长度最长的命名空间；
    /// - **契约 (What)**：返回 `None` 表示键不属于任何接口命名空间。
    ///   代价是名为 `error/...` 的接口无法出现在状态命名空间中，这是线上前缀方案固有的歧义。
    pub fn classify(key: &str) -> Option<Namespace> {
        Self::ALL
            .into_iter()
            .filter(|ns| key.starts_with(ns.prefix()))
            .max_by_key(|ns| ns.prefix().len())
    }

    /// 剥离本命名空间前缀并返回后缀。
    ///
    /// 键归属（按最长前缀）不是 `self` 时返回 [`KeyError::PrefixMismatch`]。
    pub fn strip_prefix(self, key: &str) -> Result<&str> {
        match Self::classify(key) {
            Some(owner) if owner == self => Ok(&key[self.prefix().len()..]),
            _ => Err(KeyError::PrefixMismatch {
                expected: self,
                key: key.to_owned(),
            }),
        }
    }

    /// 判断键是否归属本命名空间。
    #[inline]
    pub fn owns(self, key: &str) -> bool {
        Self::classify(key) == Some(self)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
