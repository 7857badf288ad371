//! 二进制 API 消息的公共契约。

use core::any::Any;
use core::fmt;

/// 消息在请求/应答交互中的角色。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// 单次请求，期待一个 [`MessageKind::Reply`]。
    Request,
    Reply,
    /// 转储请求，期待零到多个 [`MessageKind::Details`]。
    Dump,
    Details,
}

impl MessageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Reply => "reply",
            Self::Dump => "dump",
            Self::Details => "details",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 可被注册表按名构造的消息。
///
/// # 教案式说明
/// - **意图 (Why)**：注册表只持有 `Box<dyn Message>`，调用方需要名称、角色与向下转型三种能力；
/// - **契约 (What)**：`name` 为注册表中的类型名（如 `MemifCreate`），`wire_name` 为线上消息名
///   （如 `memif_create`）；二者在同一插件内均唯一；
/// - **执行 (How)**：具体类型通过 [`Message::as_any`] 暴露 `Any`，
///   `dyn Message` 上的 [`downcast_ref`](#method.downcast_ref) 据此还原具体类型。
pub trait Message: Any + fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn wire_name(&self) -> &'static str;

    fn kind(&self) -> MessageKind;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Message {
    /// 尝试把消息还原为具体类型。
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }

    pub fn is<M: Message>(&self) -> bool {
        self.as_any().is::<M>()
    }
}
