//! watch 事件分发器：把存储 watch 推送的键按命名空间扇出。
//!
//! # 教案式说明
//! - **意图 (Why)**：watch 流中的键来自所有命名空间且无序，分发器不预先排序，
//!   而是依次交给各订阅命名空间的解析器，解析器返回 `PrefixMismatch` 即视为“不是我的”；
//! - **执行 (How)**：命名空间隔离保证至多一个解析器认领某个键；认领后若后缀畸形，
//!   该错误被上报而非吞掉；
//! - **契约 (What)**：分发过程无共享可变状态，[`Demultiplexer`] 可在多个线程间共享只读引用。

use std::collections::BTreeMap;

use crate::config::{ConfigError, WatchConfig};
use crate::error::{KeyError, Result};
use crate::key::InterfaceKey;
use crate::namespace::Namespace;

/// watch 事件类型。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchOp {
    Put,
    Delete,
}

/// 存储 watch 推送的原始事件。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEvent {
    pub key: String,
    pub op: WatchOp,
}

impl WatchEvent {
    pub fn put(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op: WatchOp::Put,
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op: WatchOp::Delete,
        }
    }
}

/// 已认领并解析的事件。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedEvent {
    pub op: WatchOp,
    pub key: InterfaceKey,
}

impl RoutedEvent {
    pub fn namespace(&self) -> Namespace {
        self.key.namespace()
    }
}

/// 批量分发的结果。
#[derive(Debug, Default)]
pub struct DemuxReport {
    routed: BTreeMap<Namespace, Vec<RoutedEvent>>,
    skipped: usize,
    malformed: Vec<KeyError>,
}

impl DemuxReport {
    /// 指定命名空间收到的事件，保持输入顺序。
    pub fn events(&self, namespace: Namespace) -> &[RoutedEvent] {
        self.routed.get(&namespace).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn namespaces(&self) -> impl Iterator<Item = Namespace> + '_ {
        self.routed.keys().copied()
    }

    pub fn routed_count(&self) -> usize {
        self.routed.values().map(Vec::len).sum()
    }

    /// 未被任何订阅命名空间认领的事件数。
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn malformed(&self) -> &[KeyError] {
        &self.malformed
    }
}

/// 按订阅配置分发 watch 事件。缺省订阅全部命名空间。
#[derive(Clone, Debug, Default)]
pub struct Demultiplexer {
    config: WatchConfig,
}

impl Demultiplexer {
    pub fn new(config: WatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// 分发单个事件。
    ///
    /// - `Ok(None)`：没有订阅命名空间认领该键；
    /// - `Ok(Some(_))`：已认领并解析；
    /// - `Err(_)`：被认领但后缀畸形。
    pub fn route(&self, event: &WatchEvent) -> Result<Option<RoutedEvent>> {
        for &namespace in &self.config.namespaces {
            match InterfaceKey::parse_in(namespace, &event.key) {
                Ok(key) => {
                    tracing::debug!(
                        namespace = namespace.as_str(),
                        interface = key.interface_name(),
                        op = ?event.op,
                        "routed watch event"
                    );
                    return Ok(Some(RoutedEvent { op: event.op, key }));
                }
                Err(err) if err.is_foreign() => continue,
                Err(err) => {
                    tracing::warn!(
                        namespace = namespace.as_str(),
                        code = err.code(),
                        error = %err,
                        "dropping malformed watch key"
                    );
                    return Err(err);
                }
            }
        }
        tracing::trace!(key = %event.key, "watch key owned by no subscribed namespace");
        Ok(None)
    }

    /// 批量分发，按命名空间分桶。
    ///
    /// 严格模式下遇到首个畸形键即返回该错误；否则畸形键收集进报告，分发继续。
    pub fn route_batch<'a, I>(&self, events: I) -> Result<DemuxReport>
    where
        I: IntoIterator<Item = &'a WatchEvent>,
    {
        let mut report = DemuxReport::default();
        for event in events {
            match self.route(event) {
                Ok(Some(routed)) => report
                    .routed
                    .entry(routed.namespace())
                    .or_default()
                    .push(routed),
                Ok(None) => report.skipped += 1,
                Err(err) if self.config.strict => return Err(err),
                Err(err) => report.malformed.push(err),
            }
        }
        Ok(report)
    }
}
