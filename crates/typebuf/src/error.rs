// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the buffer, views and visitor.

use thiserror::Error;

/// Errors produced by [`TypedBuffer`](crate::TypedBuffer) and
/// [`DispatchVisitor`](crate::DispatchVisitor) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Typed access requested a different type than the one stored.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// View length does not match the requested type size.
    #[error("size mismatch: expected {expected} bytes, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    /// Descriptor range lies outside the written region.
    #[error("range {offset}..{offset}+{length} outside used region of {used} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        used: usize,
    },

    /// Descriptor was issued by a different buffer.
    #[error("descriptor belongs to buffer #{descriptor_owner}, not buffer #{buffer}")]
    ForeignDescriptor { descriptor_owner: u64, buffer: u64 },

    /// Growth would exceed the configured capacity limit.
    #[error("capacity exceeded: {requested} bytes requested, limit is {limit}")]
    CapacityExceeded { requested: usize, limit: usize },

    /// The allocator could not provide the requested storage.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailed { requested: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BufferError>;
