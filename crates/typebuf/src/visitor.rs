// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-keyed dispatch over a [`TypedBuffer`].
//!
//! A visitor is a projection over a subset of the stored types: values whose
//! type has no handler are skipped silently, and handlers for types that were
//! never stored are simply never called. Every pass re-resolves descriptors
//! and views from the currently bound buffer, so nothing cached from an
//! earlier pass (or an earlier buffer) is ever trusted.

use crate::buffer::TypedBuffer;
use crate::error::Result;
use crate::storable::Storable;
use crate::type_key::TypeKey;
use crate::view::ValueMut;
use std::collections::HashMap;
use std::fmt;

/// Handler invoked with a mutable view of one matching value.
pub type Handler<'a> = Box<dyn FnMut(ValueMut<'_>) -> Result<()> + 'a>;

/// Outcome of one [`DispatchVisitor::dispatch`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Descriptors walked.
    pub visited: usize,
    /// Descriptors that had a handler.
    pub matched: usize,
    /// Descriptors without a handler.
    pub skipped: usize,
}

/// Walks a bound buffer in insertion order and runs per-type handlers.
///
/// The visitor borrows its buffer mutably for `'a`, so the buffer can neither
/// move nor be dropped while bound. Use [`buffer_mut`](Self::buffer_mut) to
/// append between passes.
pub struct DispatchVisitor<'a> {
    buffer: &'a mut TypedBuffer,
    handlers: HashMap<TypeKey, Handler<'a>>,
}

impl<'a> DispatchVisitor<'a> {
    /// Bind a new visitor to `buffer`, with no handlers.
    pub fn new(buffer: &'a mut TypedBuffer) -> Self {
        Self {
            buffer,
            handlers: HashMap::new(),
        }
    }

    /// Switch to another buffer, returning the previously bound one.
    ///
    /// Handlers are kept. The next pass walks `buffer` from its first value.
    pub fn rebind(&mut self, buffer: &'a mut TypedBuffer) -> &'a mut TypedBuffer {
        log::debug!(
            "[typebuf] visitor rebound from buffer {} to {}",
            self.buffer.id(),
            buffer.id()
        );
        std::mem::replace(&mut self.buffer, buffer)
    }

    pub fn buffer(&self) -> &TypedBuffer {
        &*self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut TypedBuffer {
        &mut *self.buffer
    }

    /// Unbind, handing the buffer borrow back.
    pub fn release(self) -> &'a mut TypedBuffer {
        self.buffer
    }

    /// Install the raw handler for `key`. Returns true if one was replaced.
    pub fn register_raw<F>(&mut self, key: TypeKey, handler: F) -> bool
    where
        F: FnMut(ValueMut<'_>) -> Result<()> + 'a,
    {
        let replaced = self.handlers.insert(key, Box::new(handler)).is_some();
        if replaced {
            log::trace!("[typebuf] handler for {} replaced", key);
        }
        replaced
    }

    /// Install a typed handler for `T`. Returns true if one was replaced.
    ///
    /// The handler gets a copy of the value; whatever it leaves in `&mut T`
    /// is written back to the buffer.
    pub fn register<T, F>(&mut self, mut handler: F) -> bool
    where
        T: Storable,
        F: FnMut(&mut T) + 'a,
    {
        self.register_raw(TypeKey::of::<T>(), move |mut view: ValueMut<'_>| {
            view.with::<T, ()>(|value| handler(value))
        })
    }

    /// Remove the handler for `key`. Returns true if one existed.
    pub fn unregister(&mut self, key: TypeKey) -> bool {
        self.handlers.remove(&key).is_some()
    }

    pub fn has_handler(&self, key: TypeKey) -> bool {
        self.handlers.contains_key(&key)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Run the matching handler for every stored value, in insertion order.
    ///
    /// Values without a handler are skipped. The first handler error aborts
    /// the pass; writes made by earlier handlers persist.
    pub fn dispatch(&mut self) -> Result<DispatchStats> {
        let buffer = &mut *self.buffer;
        let mut stats = DispatchStats::default();

        for index in 0..buffer.len() {
            let Some(descriptor) = buffer.descriptor(index) else {
                break;
            };
            stats.visited += 1;

            let Some(handler) = self.handlers.get_mut(&descriptor.key()) else {
                log::trace!("[typebuf] no handler for {}, skipped", descriptor);
                stats.skipped += 1;
                continue;
            };

            let view = buffer.view(&descriptor)?;
            if let Err(e) = handler(view) {
                log::debug!("[typebuf] handler for {} failed: {}", descriptor, e);
                return Err(e);
            }
            stats.matched += 1;
        }

        log::debug!(
            "[typebuf] dispatch over buffer {}: {} visited, {} matched, {} skipped",
            buffer.id(),
            stats.visited,
            stats.matched,
            stats.skipped
        );
        Ok(stats)
    }
}

impl fmt::Debug for DispatchVisitor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchVisitor")
            .field("buffer", &self.buffer.id())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
