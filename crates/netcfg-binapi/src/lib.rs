#![deny(unsafe_code)]

//! # netcfg-binapi
//!
//! ## 定位与职责（Why）
//! - 数据面代理通过二进制 API 与转发引擎通信，消息类型需要能按名称动态构造，
//!   例如从通道握手得到的消息表中反查本地类型；
//! - 以编译期常量表代替运行时反射：名称、构造函数与版本常量都在静态表中显式列出。
//!
//! ## 模块划分（Where）
//! - `message`：[`Message`] trait 与消息种类；
//! - `memif`：memif 插件的六个请求/应答/转储消息；
//! - `registry`：消息表、常量表与按名构造的 [`MessageRegistry`]。

pub mod memif;
pub mod message;
pub mod registry;

pub use memif::{
    MemifCreate, MemifCreateReply, MemifDelete, MemifDeleteReply, MemifDetails, MemifDump,
    VL_API_VERSION,
};
pub use message::{Message, MessageKind};
pub use registry::{
    ConstantEntry, MEMIF_CONSTANTS, MEMIF_MESSAGES, MessageEntry, MessageRegistry, RegistryError,
};
