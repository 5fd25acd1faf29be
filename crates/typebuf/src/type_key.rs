// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide type identity registry.
//!
//! Every distinct Rust type gets a small sequential id the first time it is
//! seen. Ids start at 1, are never reused and never change once assigned, so
//! two different types can never share a key (unlike a hash of the type
//! name). The key also carries the type's size, which lets a view verify the
//! exact byte length before reinterpreting stored bytes. Alignment is not
//! recorded: stored values are packed and only ever copied out unaligned.

use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

struct Registry {
    keys: HashMap<TypeId, TypeKey>,
    next_id: u32,
}

impl Registry {
    fn new() -> Self {
        Self {
            keys: HashMap::new(),
            next_id: 1,
        }
    }
}

fn registry() -> &'static RwLock<Registry> {
    REGISTRY.get_or_init(|| RwLock::new(Registry::new()))
}

/// Identity of a stored type.
///
/// Equality and hashing only look at the registry id; size and name are
/// layout metadata attached at registration time.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: u32,
    size: usize,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`, registering it on first use.
    pub fn of<T: 'static>() -> Self {
        let type_id = TypeId::of::<T>();

        if let Some(key) = registry().read().keys.get(&type_id) {
            return *key;
        }

        let mut reg = registry().write();
        // Another caller may have registered T between the two locks.
        if let Some(key) = reg.keys.get(&type_id) {
            return *key;
        }
        let key = TypeKey {
            id: reg.next_id,
            size: std::mem::size_of::<T>(),
            name: type_name::<T>(),
        };
        reg.next_id += 1;
        reg.keys.insert(type_id, key);
        log::trace!("[typebuf] registered type {} as #{}", key.name, key.id);
        key
    }

    /// Sequential registry id (>= 1).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// `size_of::<T>()` of the registered type.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fully-qualified type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Number of distinct types registered so far in this process.
pub fn registered_types() -> usize {
    registry().read().keys.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Meters(#[allow(dead_code)] u32);
    struct Seconds(#[allow(dead_code)] u32);

    #[test]
    fn test_same_type_same_key() {
        let a = TypeKey::of::<u64>();
        let b = TypeKey::of::<u64>();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
        assert_eq!(a.size(), 8);
    }

    #[test]
    fn test_equal_layout_types_get_distinct_ids() {
        let meters = TypeKey::of::<Meters>();
        let seconds = TypeKey::of::<Seconds>();
        assert_eq!(meters.size(), seconds.size());
        assert_ne!(meters, seconds);
        assert_ne!(meters.id(), seconds.id());
    }

    #[test]
    fn test_later_registration_gets_higher_id() {
        struct First;
        struct Second;

        let first = TypeKey::of::<First>();
        let before = registered_types();
        let second = TypeKey::of::<Second>();

        assert!(first.id() >= 1);
        assert!(second.id() > first.id());
        assert!(registered_types() > before);
        // re-registering changes nothing
        assert_eq!(TypeKey::of::<First>().id(), first.id());
        assert_eq!(TypeKey::of::<Second>().id(), second.id());
    }

    #[test]
    fn test_display_includes_name_and_id() {
        let key = TypeKey::of::<i16>();
        assert_eq!(key.to_string(), format!("i16#{}", key.id()));
    }

    #[test]
    fn test_concurrent_registration_agrees() {
        struct Contended;

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(TypeKey::of::<Contended>))
            .collect();
        let keys: Vec<TypeKey> = handles
            .into_iter()
            .map(|h| h.join().expect("registration thread panicked"))
            .collect();
        assert!(keys.windows(2).all(|w| w[0].id() == w[1].id()));
    }
}
