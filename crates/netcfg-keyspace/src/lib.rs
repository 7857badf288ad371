#![deny(unsafe_code)]

//! # netcfg-keyspace
//!
//! ## 定位与职责（Why）
//! - 定义网络接口的配置对象、运行状态、错误记录及派生属性在外部 KV 存储中的扁平键表示，
//!   配置代理与各 watcher 共享同一前缀方案；
//! - 从键中还原结构化身份：接口名，以及地址命名空间中的已分配网络。
//!
//! ## 架构嵌入（Where）
//! - `namespace`：封闭的命名空间枚举与前缀表，前缀即线上契约；
//! - `key`：纯函数形式的键构建器与解析器，含以后缀为锚点的地址键消歧算法；
//! - `error`：`PrefixMismatch` / `MalformedSuffix` / `InvalidAddress` 三类可恢复错误；
//! - `demux`：把 watch 事件按命名空间扇出的分发器；
//! - `store`：KV 存储读写接缝与进程内实现；
//! - `config`：分发器的 TOML 订阅配置。
//!
//! ## 并发模型（What）
//! - 构建器与解析器无共享状态、无阻塞、无 I/O，可从任意线程并发调用；
//! - 主键与派生键的写入顺序属于存储/事务层，本 crate 不涉及事务、重试或取消。

pub mod config;
pub mod demux;
pub mod error;
pub mod key;
pub mod namespace;
pub mod store;

pub use config::{ConfigError, WatchConfig};
pub use demux::{DemuxReport, Demultiplexer, RoutedEvent, WatchEvent, WatchOp};
pub use error::{KeyError, KeyErrorKind, Result, SuffixDefect};
pub use key::{
    AssignedAddress, InterfaceKey, dhcp_client_key, dhcp_lease_key, interface_address_key,
    interface_address_key_for, interface_error_key, interface_key, interface_state_key,
    parse_dhcp_client_key, parse_dhcp_lease_key, parse_interface_address_key,
    parse_interface_error_key, parse_interface_key, parse_interface_state_key,
    parse_unnumbered_key, unnumbered_key,
};
pub use namespace::{Namespace, SEPARATOR, SuffixShape};
pub use store::{InterfaceKeyspace, KeyValueStore, MemoryStore, StoreError};

pub use ipnet::IpNet;
