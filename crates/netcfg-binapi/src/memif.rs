//! memif（共享内存接口）插件的二进制 API 消息。
//!
//! 字段与转发引擎 memif 插件的消息定义一一对应；定长字节数组在线上按零填充，
//! 此处以 `Vec<u8>` 承载有效部分。

use core::any::Any;

use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageKind};

/// memif 消息集的 API 版本校验值（占位值）。
///
/// 真实值由 memif API 定义的 CRC 生成，目前尚未接入生成流程；
/// 在替换为生成值之前，不要拿它与转发引擎握手时报告的版本比对。
// TODO: regenerate from memif.api.json once the binding generator is wired into the build.
pub const VL_API_VERSION: u32 = 0x9264_56a9;

/// 接口角色：主端创建共享内存区域，从端连接。
pub const ROLE_MASTER: u8 = 0;
pub const ROLE_SLAVE: u8 = 1;

macro_rules! impl_message {
    ($ty:ident, $wire:literal, $kind:expr) => {
        impl $ty {
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl Message for $ty {
            fn name(&self) -> &'static str {
                stringify!($ty)
            }

            fn wire_name(&self) -> &'static str {
                $wire
            }

            fn kind(&self) -> MessageKind {
                $kind
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// 创建 memif 接口。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemifCreate {
    pub role: u8,
    pub mode: u8,
    pub id: u32,
    pub socket_filename: Vec<u8>,
    pub secret: Vec<u8>,
    pub ring_size: u32,
    pub buffer_size: u16,
    pub hw_addr_set: u8,
    pub hw_addr: [u8; 6],
    pub rx_queues: u8,
    pub tx_queues: u8,
}

impl_message!(MemifCreate, "memif_create", MessageKind::Request);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemifCreateReply {
    pub retval: i32,
    pub sw_if_index: u32,
}

impl_message!(MemifCreateReply, "memif_create_reply", MessageKind::Reply);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemifDelete {
    pub sw_if_index: u32,
}

impl_message!(MemifDelete, "memif_delete", MessageKind::Request);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemifDeleteReply {
    pub retval: i32,
}

impl_message!(MemifDeleteReply, "memif_delete_reply", MessageKind::Reply);

/// 转储应答中的单个 memif 接口。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemifDetails {
    pub sw_if_index: u32,
    pub if_name: Vec<u8>,
    pub hw_addr: [u8; 6],
    pub id: u32,
    pub role: u8,
    pub mode: u8,
    pub socket_filename: Vec<u8>,
    pub ring_size: u32,
    pub buffer_size: u16,
    pub admin_up_down: u8,
    pub link_up_down: u8,
}

impl_message!(MemifDetails, "memif_details", MessageKind::Details);

impl MemifDetails {
    /// 去掉零填充后的接口名。
    pub fn interface_name(&self) -> String {
        let end = self
            .if_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.if_name.len());
        String::from_utf8_lossy(&self.if_name[..end]).into_owned()
    }

    pub fn is_link_up(&self) -> bool {
        self.link_up_down != 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemifDump {}

impl_message!(MemifDump, "memif_dump", MessageKind::Dump);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_type_and_wire_conventions() {
        let create = MemifCreate::new();
        assert_eq!(create.name(), "MemifCreate");
        assert_eq!(create.wire_name(), "memif_create");
        assert_eq!(create.kind(), MessageKind::Request);
        assert_eq!(MemifDump::new().kind(), MessageKind::Dump);
        assert_eq!(MemifDetails::new().wire_name(), "memif_details");
    }

    #[test]
    fn details_strip_zero_padding_from_name() {
        let mut details = MemifDetails::new();
        details.if_name = b"memif0/1\0\0\0\0".to_vec();
        details.link_up_down = 1;
        assert_eq!(details.interface_name(), "memif0/1");
        assert!(details.is_link_up());
    }
}
