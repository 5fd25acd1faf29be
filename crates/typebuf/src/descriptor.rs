// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stored-value descriptors.

use crate::type_key::TypeKey;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`TypedBuffer`](crate::TypedBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

impl BufferId {
    pub(crate) fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location and type of one stored value.
///
/// Issued by [`TypedBuffer::append`](crate::TypedBuffer::append) in insertion
/// order. Offsets stay valid across growth because reallocation preserves the
/// byte layout; only the buffer that issued a descriptor accepts it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueDescriptor {
    key: TypeKey,
    offset: usize,
    length: usize,
    owner: BufferId,
}

impl ValueDescriptor {
    pub(crate) fn new(key: TypeKey, offset: usize, length: usize, owner: BufferId) -> Self {
        Self {
            key,
            offset,
            length,
            owner,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// First byte of the value inside the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte size of the value.
    pub fn length(&self) -> usize {
        self.length
    }

    /// One past the last byte of the value.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Buffer that issued this descriptor.
    pub fn owner(&self) -> BufferId {
        self.owner
    }
}

impl fmt::Display for ValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}..{}", self.key, self.offset, self.end())
    }
}
