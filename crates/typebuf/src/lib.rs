// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Heterogeneous value buffer with type-keyed dispatch.
//!
//! A [`TypedBuffer`] packs values of different fixed-layout types back to back
//! in one growable byte region and records a [`ValueDescriptor`] (type key,
//! offset, length) for each of them. A [`DispatchVisitor`] walks the
//! descriptors in insertion order and runs the handler registered for each
//! value's type, handing it a mutable view of exactly that value's bytes.
//!
//! # Features
//!
//! - **Collision-free type identity**: [`TypeKey`] ids come from a
//!   process-wide registry, not from hashing type names
//! - **Plain-old-data only**: values must be [`Storable`], so raw relocation
//!   and in-place byte writes are always sound
//! - **Checked downcasts**: typed access verifies type key and byte length and
//!   returns [`BufferError`] instead of reinterpreting mismatched bytes
//! - **Projection semantics**: values without a handler are skipped silently
//!
//! # Example
//!
//! ```rust
//! use typebuf::{DispatchVisitor, TypedBuffer};
//!
//! let mut buffer = TypedBuffer::new();
//! buffer.append(5i32).unwrap();
//! buffer.append(15.46f64).unwrap();
//! buffer.append(99i32).unwrap();
//!
//! let mut visitor = DispatchVisitor::new(&mut buffer);
//! visitor.register::<i32, _>(|v| *v = -1);
//! let stats = visitor.dispatch().unwrap();
//! assert_eq!(stats.matched, 2);
//! assert_eq!(stats.skipped, 1);
//! drop(visitor);
//!
//! let ints: Vec<i32> = buffer.values_of::<i32>().collect();
//! assert_eq!(ints, vec![-1, -1]);
//! ```
//!
//! # Threading
//!
//! Buffers and visitors are single-threaded: every mutation takes `&mut` and
//! handlers are not required to be `Send`. Only the type-key registry is
//! shared across threads.

pub mod buffer;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod storable;
pub mod type_key;
pub mod view;
pub mod visitor;

pub use buffer::TypedBuffer;
pub use config::{BufferConfig, MAX_ALLOCATION};
pub use descriptor::{BufferId, ValueDescriptor};
pub use error::{BufferError, Result};
pub use storable::{as_bytes, Storable};
pub use type_key::{registered_types, TypeKey};
pub use view::ValueMut;
pub use visitor::{DispatchStats, DispatchVisitor, Handler};
