//! 键值存储接缝与基于键空间的读写辅助。
//!
//! # 教案式说明
//! - **意图 (Why)**：存储的传输与 watch 机制不属于键空间，这里只定义读写所需的最小契约
//!   [`KeyValueStore`]，并提供进程内实现 [`MemoryStore`] 供测试与本地工具使用；
//! - **契约 (What)**：[`InterfaceKeyspace`] 负责把接口名翻译为键、把前缀区间读取的键还原为接口名；
//!   区间读取中属于其它命名空间的键（例如状态前缀下的错误键）会被跳过；
//! - **风险 (Trade-offs)**：主键与派生键的写入顺序由调用方/存储事务层保证，本层不提供事务。

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error;

use crate::error::KeyError;
use crate::key::{
    AssignedAddress, dhcp_client_key, dhcp_lease_key, interface_address_key, interface_error_key,
    interface_key, interface_state_key, parse_interface_address_key, unnumbered_key,
};
use crate::namespace::Namespace;

/// 存储访问错误。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 后端读写失败。
    #[error("store backend failure during `{operation}`: {detail}")]
    Backend {
        operation: &'static str,
        detail: String,
    },

    /// 键构建失败。
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// 键值存储的最小读写契约。
///
/// 实现需满足 `Send + Sync`，以便多个调和循环共享同一存储句柄。
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// 删除键，返回键此前是否存在。
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// 按字典序列出以 `prefix` 开头的全部键。
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key)
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list_keys(prefix)
    }
}

/// 进程内有序存储。
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_owned(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read();
        Ok(entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// 通过键空间读写接口对象的调和辅助。
#[derive(Debug)]
pub struct InterfaceKeyspace<S> {
    store: S,
}

impl<S: KeyValueStore> InterfaceKeyspace<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// 写入接口配置，返回所用键。
    pub fn put_config(&self, name: &str, value: Bytes) -> Result<String, StoreError> {
        self.put(interface_key(name), value)
    }

    pub fn get_config(&self, name: &str) -> Result<Option<Bytes>, StoreError> {
        self.store.get(&interface_key(name))
    }

    pub fn remove_config(&self, name: &str) -> Result<bool, StoreError> {
        self.store.delete(&interface_key(name))
    }

    pub fn put_state(&self, name: &str, value: Bytes) -> Result<String, StoreError> {
        self.put(interface_state_key(name), value)
    }

    pub fn put_error(&self, name: &str, value: Bytes) -> Result<String, StoreError> {
        self.put(interface_error_key(name), value)
    }

    /// 写入地址派生键。派生键只承载身份，值为空。
    pub fn put_address(&self, name: &str, address: &str) -> Result<String, StoreError> {
        let key = interface_address_key(name, address)?;
        self.put(key, Bytes::new())
    }

    pub fn remove_address(&self, name: &str, address: &str) -> Result<bool, StoreError> {
        let key = interface_address_key(name, address)?;
        self.store.delete(&key)
    }

    /// 按已解析的地址删除派生键，键文本与存储中的原始写法一致。
    pub fn remove_assigned(&self, assigned: &AssignedAddress) -> Result<bool, StoreError> {
        self.store.delete(&assigned.to_key())
    }

    pub fn put_unnumbered(&self, name: &str, value: Bytes) -> Result<String, StoreError> {
        self.put(unnumbered_key(name), value)
    }

    pub fn put_dhcp_client(&self, name: &str, value: Bytes) -> Result<String, StoreError> {
        self.put(dhcp_client_key(name), value)
    }

    pub fn put_dhcp_lease(&self, name: &str, value: Bytes) -> Result<String, StoreError> {
        self.put(dhcp_lease_key(name), value)
    }

    /// 已配置的接口名。
    pub fn interface_names(&self) -> Result<Vec<String>, StoreError> {
        self.names_in(Namespace::Config)
    }

    /// 已上报状态的接口名，不包含错误记录。
    pub fn state_names(&self) -> Result<Vec<String>, StoreError> {
        self.names_in(Namespace::State)
    }

    pub fn error_names(&self) -> Result<Vec<String>, StoreError> {
        self.names_in(Namespace::Error)
    }

    /// 列出名称形态命名空间下的全部接口名。
    ///
    /// # 教案式说明
    /// - **执行 (How)**：按命名空间前缀做区间读取，再逐个交给解析器；
    ///   解析器返回 `PrefixMismatch` 的键属于前缀更长的命名空间，直接跳过；
    /// - **契约 (What)**：对地址命名空间调用时返回 `MalformedSuffix`，请改用 [`Self::addresses`]。
    pub fn names_in(&self, namespace: Namespace) -> Result<Vec<String>, StoreError> {
        let keys = self.store.list_keys(namespace.prefix())?;
        let mut names = Vec::with_capacity(keys.len());
        for key in &keys {
            match namespace.parse_name(key) {
                Ok(name) => names.push(name.to_owned()),
                Err(err) if err.is_foreign() => {
                    tracing::trace!(
                        namespace = namespace.as_str(),
                        key = %key,
                        "skipping foreign key in range read"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(names)
    }

    /// 全部已分配地址。畸形的派生键被记录并跳过。
    pub fn addresses(&self) -> Result<Vec<AssignedAddress>, StoreError> {
        let keys = self.store.list_keys(Namespace::AddressDerived.prefix())?;
        let mut addresses = Vec::with_capacity(keys.len());
        for key in &keys {
            match parse_interface_address_key(key) {
                Ok(assigned) => addresses.push(assigned),
                Err(err) => {
                    tracing::warn!(
                        code = err.code(),
                        error = %err,
                        "skipping malformed address key"
                    );
                }
            }
        }
        Ok(addresses)
    }

    /// 指定接口的已分配地址。
    pub fn addresses_of(&self, name: &str) -> Result<Vec<AssignedAddress>, StoreError> {
        let mut addresses = self.addresses()?;
        addresses.retain(|assigned| assigned.interface == name);
        Ok(addresses)
    }

    fn put(&self, key: String, value: Bytes) -> Result<String, StoreError> {
        self.store.put(&key, value)?;
        tracing::debug!(key = %key, "stored interface key");
        Ok(key)
    }
}
