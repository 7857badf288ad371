//! 按名称构造消息的注册表。
//!
//! # 教案式说明
//! - **意图 (Why)**：通道握手后，代理只拿到消息名称；注册表把名称映射回本地类型，
//!   并提供与类型名对应的 `New*` 构造入口及 API 版本常量；
//! - **执行 (How)**：消息与常量在编译期静态表中列出，[`MessageRegistry::memif`] 首次访问时
//!   建立索引并缓存在 `OnceLock` 中，之后只读；
//! - **契约 (What)**：未知名称返回 [`RegistryError`]，不会 panic；
//! - **风险 (Trade-offs)**：新增消息需同步修改静态表，表内名称重复时仅保留首项并记录告警。

use std::collections::BTreeMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::memif::{
    MemifCreate, MemifCreateReply, MemifDelete, MemifDeleteReply, MemifDetails, MemifDump,
    VL_API_VERSION,
};
use crate::message::Message;

/// 稳定错误码。
pub mod codes {
    pub const UNKNOWN_MESSAGE: &str = "binapi.unknown_message";
    pub const UNKNOWN_CONSTRUCTOR: &str = "binapi.unknown_constructor";
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("message `{name}` is not registered")]
    UnknownMessage { name: String },

    #[error("constructor `{name}` is not registered")]
    UnknownConstructor { name: String },
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownMessage { .. } => codes::UNKNOWN_MESSAGE,
            Self::UnknownConstructor { .. } => codes::UNKNOWN_CONSTRUCTOR,
        }
    }
}

/// 消息表中的一项。
#[derive(Clone, Copy)]
pub struct MessageEntry {
    /// 类型名，如 `MemifCreate`。
    pub name: &'static str,
    /// 构造入口名，如 `NewMemifCreate`。
    pub constructor_name: &'static str,
    pub constructor: fn() -> Box<dyn Message>,
}

impl MessageEntry {
    pub fn construct(&self) -> Box<dyn Message> {
        (self.constructor)()
    }
}

impl core::fmt::Debug for MessageEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageEntry")
            .field("name", &self.name)
            .field("constructor_name", &self.constructor_name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstantEntry {
    pub name: &'static str,
    pub value: u32,
}

fn construct<M: Message + Default>() -> Box<dyn Message> {
    Box::new(M::default())
}

pub static MEMIF_MESSAGES: [MessageEntry; 6] = [
    MessageEntry {
        name: "MemifCreate",
        constructor_name: "NewMemifCreate",
        constructor: construct::<MemifCreate>,
    },
    MessageEntry {
        name: "MemifCreateReply",
        constructor_name: "NewMemifCreateReply",
        constructor: construct::<MemifCreateReply>,
    },
    MessageEntry {
        name: "MemifDelete",
        constructor_name: "NewMemifDelete",
        constructor: construct::<MemifDelete>,
    },
    MessageEntry {
        name: "MemifDeleteReply",
        constructor_name: "NewMemifDeleteReply",
        constructor: construct::<MemifDeleteReply>,
    },
    MessageEntry {
        name: "MemifDetails",
        constructor_name: "NewMemifDetails",
        constructor: construct::<MemifDetails>,
    },
    MessageEntry {
        name: "MemifDump",
        constructor_name: "NewMemifDump",
        constructor: construct::<MemifDump>,
    },
];

pub static MEMIF_CONSTANTS: [ConstantEntry; 1] = [ConstantEntry {
    name: "VlAPIVersion",
    value: VL_API_VERSION,
}];

/// 消息名与构造入口名的只读索引。
#[derive(Debug)]
pub struct MessageRegistry {
    by_name: BTreeMap<&'static str, &'static MessageEntry>,
    by_constructor: BTreeMap<&'static str, &'static MessageEntry>,
    constants: BTreeMap<&'static str, u32>,
}

impl MessageRegistry {
    /// memif 插件的全局注册表。
    pub fn memif() -> &'static MessageRegistry {
        static REGISTRY: OnceLock<MessageRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| Self::from_tables(&MEMIF_MESSAGES, &MEMIF_CONSTANTS))
    }

    /// 由静态表建立索引；名称重复时保留首项。
    pub fn from_tables(
        messages: &'static [MessageEntry],
        constants: &'static [ConstantEntry],
    ) -> Self {
        let mut by_name = BTreeMap::new();
        let mut by_constructor = BTreeMap::new();
        for entry in messages {
            if by_name.contains_key(entry.name) {
                tracing::warn!(name = entry.name, "ignoring duplicate message entry");
                continue;
            }
            by_name.insert(entry.name, entry);
            by_constructor.insert(entry.constructor_name, entry);
        }
        let constants = constants.iter().map(|c| (c.name, c.value)).collect();
        tracing::debug!(messages = by_name.len(), "message registry initialised");
        Self {
            by_name,
            by_constructor,
            constants,
        }
    }

    /// 按类型名构造一条默认消息。
    pub fn new_message(&self, name: &str) -> Result<Box<dyn Message>, RegistryError> {
        self.by_name
            .get(name)
            .map(|entry| entry.construct())
            .ok_or_else(|| RegistryError::UnknownMessage {
                name: name.to_owned(),
            })
    }

    /// 按构造入口名（`New*`）构造消息。
    pub fn call_constructor(
        &self,
        constructor_name: &str,
    ) -> Result<Box<dyn Message>, RegistryError> {
        self.by_constructor
            .get(constructor_name)
            .map(|entry| entry.construct())
            .ok_or_else(|| RegistryError::UnknownConstructor {
                name: constructor_name.to_owned(),
            })
    }

    pub fn entry(&self, name: &str) -> Option<&'static MessageEntry> {
        self.by_name.get(name).copied()
    }

    /// 已注册的类型名，按字典序。
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn constant(&self, name: &str) -> Option<u32> {
        self.constants.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use tracing_test::traced_test;

    static DUPLICATED: [MessageEntry; 2] = [
        MessageEntry {
            name: "MemifDump",
            constructor_name: "NewMemifDump",
            constructor: construct::<MemifDump>,
        },
        MessageEntry {
            name: "MemifDump",
            constructor_name: "NewMemifDumpAgain",
            constructor: construct::<MemifDetails>,
        },
    ];

    #[test]
    fn constructor_and_type_names_agree() {
        for entry in &MEMIF_MESSAGES {
            assert_eq!(entry.constructor_name, format!("New{}", entry.name));
            assert_eq!(entry.construct().name(), entry.name);
        }
    }

    #[traced_test]
    #[test]
    fn duplicate_entries_keep_the_first() {
        let registry = MessageRegistry::from_tables(&DUPLICATED, &[]);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.new_message("MemifDump").unwrap().kind(),
            MessageKind::Dump
        );
        assert!(registry.call_constructor("NewMemifDumpAgain").is_err());
        assert!(logs_contain("ignoring duplicate message entry"));
    }
}
