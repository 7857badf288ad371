//! 键构建器与解析器。
//!
//! # 教案式说明
//! - **构建 (How)**：`prefix + name [+ "/" + 附加分量]`，不校验接口名内容；身份校验属于配置层；
//! - **解析 (How)**：普通命名空间剥离前缀后，剩余部分整体即接口名，内嵌分隔符原样保留；
//!   地址命名空间从**末尾**锚定固定的 `(ip, mask)` 两段，其余部分还原为接口名；
//! - **契约 (What)**：所有函数均为纯函数，可在任意线程并发调用；解析结果满足
//!   `build(parse(key)) == key`。

use core::fmt;
use core::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::{KeyError, Result, SuffixDefect};
use crate::namespace::{Namespace, SEPARATOR, SuffixShape};

fn name_key(namespace: Namespace, name: &str) -> String {
    let prefix = namespace.prefix();
    let mut key = String::with_capacity(prefix.len() + name.len());
    key.push_str(prefix);
    key.push_str(name);
    key
}

/// 接口配置键。
pub fn interface_key(name: &str) -> String {
    name_key(Namespace::Config, name)
}

/// 接口状态键。
pub fn interface_state_key(name: &str) -> String {
    name_key(Namespace::State, name)
}

/// 接口错误键。
pub fn interface_error_key(name: &str) -> String {
    name_key(Namespace::Error, name)
}

/// unnumbered 派生键。
pub fn unnumbered_key(name: &str) -> String {
    name_key(Namespace::UnnumberedDerived, name)
}

/// DHCP 客户端派生键。
pub fn dhcp_client_key(name: &str) -> String {
    name_key(Namespace::DhcpClientDerived, name)
}

/// DHCP 租约键。
pub fn dhcp_lease_key(name: &str) -> String {
    name_key(Namespace::DhcpLeaseDerived, name)
}

/// 构建地址派生键 `prefix + name/ip/mask`。
///
/// # 教案式说明
/// - **契约 (What)**：`address` 必须恰好包含一个分隔符（`ip/mask`）；否则返回
///   [`KeyError::InvalidAddress`]，而不是越界读取切分结果；
/// - **注意 (Trade-offs)**：这里只做形态切分，不校验 `ip/mask` 是否构成合法网络，
///   对应的校验在解析侧完成。
pub fn interface_address_key(name: &str, address: &str) -> Result<String> {
    let mut parts = address.split(SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(ip), Some(mask), None) => {
            let prefix = Namespace::AddressDerived.prefix();
            let mut key =
                String::with_capacity(prefix.len() + name.len() + ip.len() + mask.len() + 2);
            key.push_str(prefix);
            key.push_str(name);
            key.push(SEPARATOR);
            key.push_str(ip);
            key.push(SEPARATOR);
            key.push_str(mask);
            Ok(key)
        }
        _ => {
            tracing::warn!(interface = name, address, "rejecting address without ip/mask form");
            Err(KeyError::InvalidAddress {
                address: address.to_owned(),
            })
        }
    }
}

/// 以已解析的网络构建地址派生键，保留网络中的主机位。
pub fn interface_address_key_for(name: &str, network: &IpNet) -> String {
    format!(
        "{}{name}{SEPARATOR}{}",
        Namespace::AddressDerived.prefix(),
        canonical_address(network)
    )
}

/// 解析接口配置键中的接口名。
pub fn parse_interface_key(key: &str) -> Result<&str> {
    Namespace::Config.strip_prefix(key)
}

/// 解析接口状态键中的接口名。
///
/// 状态前缀同时是错误前缀的前缀，键归属按最长前缀判定：错误键在此返回 `PrefixMismatch`。
/// 这是线上前缀方案的固有限制，名为 `error/...` 的接口写入状态命名空间后会被判定为错误键，
/// 无法往返。
pub fn parse_interface_state_key(key: &str) -> Result<&str> {
    Namespace::State.strip_prefix(key)
}

/// 解析接口错误键中的接口名。
pub fn parse_interface_error_key(key: &str) -> Result<&str> {
    Namespace::Error.strip_prefix(key)
}

/// 解析 unnumbered 派生键中的接口名。
pub fn parse_unnumbered_key(key: &str) -> Result<&str> {
    Namespace::UnnumberedDerived.strip_prefix(key)
}

/// 解析 DHCP 客户端派生键中的接口名。
pub fn parse_dhcp_client_key(key: &str) -> Result<&str> {
    Namespace::DhcpClientDerived.strip_prefix(key)
}

/// 解析 DHCP 租约键中的接口名。
pub fn parse_dhcp_lease_key(key: &str) -> Result<&str> {
    Namespace::DhcpLeaseDerived.strip_prefix(key)
}

/// 地址派生键携带的身份：接口名与已分配网络。
///
/// `network` 保留写入时的主机地址（`10.0.0.1/24` 不会被规整为 `10.0.0.0/24`）。
/// 解析得到的实例同时记录键中 `ip/mask` 的原始文本，[`AssignedAddress::to_key`] 据此重建，
/// 因此 `2001:DB8::1/64` 这类非规范写法也能还原出与存储中完全相同的键。
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignedAddress {
    pub interface: String,
    pub network: IpNet,
    #[serde(rename = "address")]
    text: String,
}

impl AssignedAddress {
    /// 以网络的规范文本构造。
    pub fn new(interface: impl Into<String>, network: IpNet) -> Self {
        Self {
            interface: interface.into(),
            text: canonical_address(&network),
            network,
        }
    }

    /// 键中 `ip/mask` 分量的文本。
    pub fn address(&self) -> &str {
        &self.text
    }

    /// 重建地址派生键。
    pub fn to_key(&self) -> String {
        let prefix = Namespace::AddressDerived.prefix();
        let mut key =
            String::with_capacity(prefix.len() + self.interface.len() + self.text.len() + 1);
        key.push_str(prefix);
        key.push_str(&self.interface);
        key.push(SEPARATOR);
        key.push_str(&self.text);
        key
    }

    pub fn into_parts(self) -> (String, IpNet) {
        (self.interface, self.network)
    }
}

fn canonical_address(network: &IpNet) -> String {
    format!("{}{SEPARATOR}{}", network.addr(), network.prefix_len())
}

/// 解析地址派生键。
///
/// # 教案式说明
/// - **意图 (Why)**：接口名是不透明的，可能含分隔符（如 `Ethernet1/0/1`），但后缀元数固定，
///   因此只能以后缀为锚点消歧，从前往后切分必然截断接口名；
/// - **执行 (How)**：
///   1. 剥离地址前缀，失败返回 `PrefixMismatch`；
///   2. 自右向左最多切两刀，得到 `mask`、`ip` 与剩余的接口名；
///   3. 分量不足三段返回 `MalformedSuffix(TooFewComponents)`；
///   4. `ip/mask` 无法解析为网络返回 `MalformedSuffix(InvalidNetwork)`；
/// - **契约 (What)**：接口名允许为空串（键形如 `prefix//ip/mask`），不做额外校验。
pub fn parse_interface_address_key(key: &str) -> Result<AssignedAddress> {
    let namespace = Namespace::AddressDerived;
    let suffix = namespace.strip_prefix(key)?;

    let mut comps = suffix.rsplitn(3, SEPARATOR);
    let (Some(mask), Some(ip), Some(name)) = (comps.next(), comps.next(), comps.next()) else {
        let found = suffix.split(SEPARATOR).count();
        return Err(KeyError::malformed(
            namespace,
            key,
            SuffixDefect::TooFewComponents { found },
        ));
    };

    let candidate = format!("{ip}{SEPARATOR}{mask}");
    let network = match IpNet::from_str(&candidate) {
        Ok(network) => network,
        Err(_) => {
            return Err(KeyError::malformed(
                namespace,
                key,
                SuffixDefect::InvalidNetwork { candidate },
            ));
        }
    };

    Ok(AssignedAddress {
        interface: name.to_owned(),
        network,
        text: candidate,
    })
}

impl Namespace {
    /// 泛型键构建入口，仅适用于后缀形态为 [`SuffixShape::Name`] 的命名空间。
    ///
    /// 地址命名空间需要地址分量，在此返回 [`KeyError::InvalidAddress`]；请改用
    /// [`interface_address_key`]。
    pub fn key_for(self, name: &str) -> Result<String> {
        match self.suffix_shape() {
            SuffixShape::Name => Ok(name_key(self, name)),
            SuffixShape::NameAddress => Err(KeyError::InvalidAddress {
                address: String::new(),
            }),
        }
    }

    /// 泛型接口名解析入口，仅适用于后缀形态为 [`SuffixShape::Name`] 的命名空间。
    pub fn parse_name(self, key: &str) -> Result<&str> {
        let suffix = self.strip_prefix(key)?;
        match self.suffix_shape() {
            SuffixShape::Name => Ok(suffix),
            SuffixShape::NameAddress => Err(KeyError::malformed(
                self,
                key,
                SuffixDefect::ShapeMismatch,
            )),
        }
    }
}

/// 已解析的接口键，每个命名空间对应一个变体。
///
/// # 教案式说明
/// - **意图 (Why)**：watch 事件到达时，调用方通常需要“这是哪个命名空间的哪个接口”，
///   用类型化枚举承载比 `(Namespace, String)` 元组更能防止误用；
/// - **契约 (What)**：[`InterfaceKey::parse`] 与 [`InterfaceKey::to_key`] 互为逆运算。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InterfaceKey {
    Config { name: String },
    State { name: String },
    Error { name: String },
    Address(AssignedAddress),
    Unnumbered { name: String },
    DhcpClient { name: String },
    DhcpLease { name: String },
}

impl InterfaceKey {
    /// 按最长前缀判定命名空间后解析键。
    ///
    /// 键不属于任何接口命名空间时，以 `Config` 作为期望命名空间返回 `PrefixMismatch`。
    pub fn parse(key: &str) -> Result<Self> {
        match Namespace::classify(key) {
            Some(namespace) => Self::parse_in(namespace, key),
            None => Err(KeyError::PrefixMismatch {
                expected: Namespace::Config,
                key: key.to_owned(),
            }),
        }
    }

    /// 在指定命名空间内解析键。
    pub fn parse_in(namespace: Namespace, key: &str) -> Result<Self> {
        let parsed = match namespace {
            Namespace::Config => Self::Config {
                name: parse_interface_key(key)?.to_owned(),
            },
            Namespace::State => Self::State {
                name: parse_interface_state_key(key)?.to_owned(),
            },
            Namespace::Error => Self::Error {
                name: parse_interface_error_key(key)?.to_owned(),
            },
            Namespace::AddressDerived => Self::Address(parse_interface_address_key(key)?),
            Namespace::UnnumberedDerived => Self::Unnumbered {
                name: parse_unnumbered_key(key)?.to_owned(),
            },
            Namespace::DhcpClientDerived => Self::DhcpClient {
                name: parse_dhcp_client_key(key)?.to_owned(),
            },
            Namespace::DhcpLeaseDerived => Self::DhcpLease {
                name: parse_dhcp_lease_key(key)?.to_owned(),
            },
        };
        Ok(parsed)
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            Self::Config { .. } => Namespace::Config,
            Self::State { .. } => Namespace::State,
            Self::Error { .. } => Namespace::Error,
            Self::Address(_) => Namespace::AddressDerived,
            Self::Unnumbered { .. } => Namespace::UnnumberedDerived,
            Self::DhcpClient { .. } => Namespace::DhcpClientDerived,
            Self::DhcpLease { .. } => Namespace::DhcpLeaseDerived,
        }
    }

    pub fn interface_name(&self) -> &str {
        match self {
            Self::Config { name }
            | Self::State { name }
            | Self::Error { name }
            | Self::Unnumbered { name }
            | Self::DhcpClient { name }
            | Self::DhcpLease { name } => name,
            Self::Address(assigned) => &assigned.interface,
        }
    }

    /// 重建键。
    pub fn to_key(&self) -> String {
        match self {
            Self::Address(assigned) => assigned.to_key(),
            other => name_key(other.namespace(), other.interface_name()),
        }
    }
}

impl fmt::Display for InterfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyErrorKind;
    use tracing_test::traced_test;

    fn net(s: &str) -> IpNet {
        s.parse().expect("测试网络格式正确")
    }

    #[test]
    fn name_keys_round_trip_with_embedded_separators() {
        for name in ["eth0", "Ethernet1/0/1", "a//b", "/leading", "trailing/", ""] {
            assert_eq!(parse_interface_key(&interface_key(name)).unwrap(), name);
            assert_eq!(parse_interface_state_key(&interface_state_key(name)).unwrap(), name);
            assert_eq!(parse_interface_error_key(&interface_error_key(name)).unwrap(), name);
            assert_eq!(parse_unnumbered_key(&unnumbered_key(name)).unwrap(), name);
            assert_eq!(parse_dhcp_client_key(&dhcp_client_key(name)).unwrap(), name);
            assert_eq!(parse_dhcp_lease_key(&dhcp_lease_key(name)).unwrap(), name);
        }
    }

    #[test]
    fn builders_emit_documented_layout() {
        assert_eq!(interface_key("eth0"), "vpp/config/v2/interface/eth0");
        assert_eq!(interface_state_key("eth0"), "vpp/status/v2/interface/eth0");
        assert_eq!(interface_error_key("eth0"), "vpp/status/v2/interface/error/eth0");
        assert_eq!(unnumbered_key("lo0"), "vpp/interface/unnumbered/lo0");
        assert_eq!(dhcp_client_key("eth1"), "vpp/interface/dhcp-client/eth1");
        assert_eq!(dhcp_lease_key("eth1"), "vpp/interface/dhcp-lease/eth1");
        assert_eq!(
            interface_address_key("eth0", "10.0.0.1/24").unwrap(),
            "vpp/interface/address/eth0/10.0.0.1/24"
        );
    }

    #[test]
    fn address_key_round_trip() {
        let key = interface_address_key("eth0", "10.0.0.1/24").unwrap();
        let parsed = parse_interface_address_key(&key).unwrap();
        assert_eq!(parsed.interface, "eth0");
        assert_eq!(parsed.network, net("10.0.0.1/24"));
        assert_eq!(parsed.to_key(), key);
    }

    #[test]
    fn address_key_anchors_on_suffix_for_slashed_names() {
        let key = interface_address_key("Ethernet1/0/1", "192.168.1.5/30").unwrap();
        assert_eq!(key, "vpp/interface/address/Ethernet1/0/1/192.168.1.5/30");
        let (name, network) = parse_interface_address_key(&key).unwrap().into_parts();
        assert_eq!(name, "Ethernet1/0/1");
        assert_eq!(network, net("192.168.1.5/30"));
    }

    #[test]
    fn address_key_accepts_ipv6() {
        let key = interface_address_key("tap0", "2001:db8::1/64").unwrap();
        let parsed = parse_interface_address_key(&key).unwrap();
        assert_eq!(parsed.network, net("2001:db8::1/64"));
        assert_eq!(parsed.to_key(), key);
    }

    #[test]
    fn address_key_with_too_few_components_is_malformed() {
        for key in [
            "vpp/interface/address/eth0",
            "vpp/interface/address/10.0.0.1/24",
            "vpp/interface/address/",
        ] {
            let err = parse_interface_address_key(key).unwrap_err();
            assert_eq!(err.kind(), KeyErrorKind::MalformedSuffix, "{key}");
            assert!(matches!(
                err,
                KeyError::MalformedSuffix {
                    defect: SuffixDefect::TooFewComponents { .. },
                    ..
                }
            ));
        }
    }

    #[test]
    fn address_key_with_invalid_network_is_malformed() {
        for key in [
            "vpp/interface/address/eth0/999.1.1.1/24",
            "vpp/interface/address/eth0/10.0.0.1/33",
            "vpp/interface/address/eth0/10.0.0.1/",
            "vpp/interface/address/eth0/x/24",
        ] {
            let err = parse_interface_address_key(key).unwrap_err();
            assert!(
                matches!(
                    err,
                    KeyError::MalformedSuffix {
                        namespace: Namespace::AddressDerived,
                        defect: SuffixDefect::InvalidNetwork { .. },
                        ..
                    }
                ),
                "{key}: {err}"
            );
        }
    }

    #[traced_test]
    #[test]
    fn address_builder_rejects_missing_or_extra_separator() {
        for address in ["10.0.0.1", "", "10.0.0.1/24/extra"] {
            let err = interface_address_key("eth0", address).unwrap_err();
            assert_eq!(
                err,
                KeyError::InvalidAddress {
                    address: address.to_owned()
                }
            );
        }
        assert!(logs_contain("rejecting address without ip/mask form"));
    }

    #[test]
    fn every_parser_rejects_foreign_prefixes() {
        let samples = [
            interface_key("eth0"),
            interface_state_key("eth0"),
            interface_error_key("eth0"),
            interface_address_key("eth0", "10.0.0.1/24").unwrap(),
            unnumbered_key("eth0"),
            dhcp_client_key("eth0"),
            dhcp_lease_key("eth0"),
        ];
        for (owner, key) in Namespace::ALL.into_iter().zip(samples.iter()) {
            for ns in Namespace::ALL {
                let result = InterfaceKey::parse_in(ns, key);
                if ns == owner {
                    assert!(result.is_ok(), "{ns} 应接受 {key}");
                } else {
                    assert!(result.unwrap_err().is_foreign(), "{ns} 不应接受 {key}");
                }
            }
        }
    }

    #[test]
    fn generic_entry_points_respect_suffix_shape() {
        assert_eq!(
            Namespace::DhcpLeaseDerived.key_for("eth0").unwrap(),
            dhcp_lease_key("eth0")
        );
        assert_eq!(
            Namespace::AddressDerived.key_for("eth0").unwrap_err().kind(),
            KeyErrorKind::InvalidAddress
        );
        let key = interface_address_key("eth0", "10.0.0.1/24").unwrap();
        assert_eq!(
            Namespace::AddressDerived.parse_name(&key).unwrap_err().kind(),
            KeyErrorKind::MalformedSuffix
        );
        assert_eq!(
            Namespace::Error.parse_name(&interface_error_key("e/1")).unwrap(),
            "e/1"
        );
    }

    #[test]
    fn interface_key_parse_classifies_and_rebuilds() {
        let key = interface_error_key("Ethernet1/0/1");
        let parsed = InterfaceKey::parse(&key).unwrap();
        assert_eq!(
            parsed,
            InterfaceKey::Error {
                name: "Ethernet1/0/1".into()
            }
        );
        assert_eq!(parsed.namespace(), Namespace::Error);
        assert_eq!(parsed.to_key(), key);

        let err = InterfaceKey::parse("vpp/config/v2/bd/bd1").unwrap_err();
        assert!(err.is_foreign());
    }

    #[test]
    fn state_names_under_error_segment_belong_to_error_namespace() {
        let key = interface_state_key("error/eth0");
        assert_eq!(key, interface_error_key("eth0"));
        assert!(parse_interface_state_key(&key).unwrap_err().is_foreign());
        assert_eq!(parse_interface_error_key(&key).unwrap(), "eth0");
    }

    #[test]
    fn non_canonical_address_text_rebuilds_exactly() {
        for address in ["2001:DB8::1/64", "2001:0db8:0:0::1/64", "::FFFF:10.0.0.1/120"] {
            let key = interface_address_key("eth0", address).unwrap();
            let parsed = parse_interface_address_key(&key).unwrap();
            assert_eq!(parsed.address(), address);
            assert_eq!(parsed.to_key(), key);
            assert_eq!(InterfaceKey::parse(&key).unwrap().to_key(), key);
        }

        let parsed = parse_interface_address_key("vpp/interface/address/eth0/2001:DB8::1/64")
            .unwrap();
        assert_eq!(parsed.network, net("2001:db8::1/64"));
        assert_ne!(parsed, AssignedAddress::new("eth0", net("2001:db8::1/64")));
        assert_eq!(
            AssignedAddress::new("eth0", net("2001:db8::1/64")).to_key(),
            "vpp/interface/address/eth0/2001:db8::1/64"
        );
    }

    #[test]
    fn rebuild_twice_is_idempotent() {
        let key = interface_address_key("GigabitEthernet0/8/0", "172.16.0.9/16").unwrap();
        let first = InterfaceKey::parse(&key).unwrap().to_key();
        let second = InterfaceKey::parse(&first).unwrap().to_key();
        assert_eq!(first, key);
        assert_eq!(second, first);
    }
}
