// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Append-only byte arena holding values of heterogeneous `Storable` types.
//!
//! # Layout
//!
//! ```text
//!  storage: | i32 | i32 |   f64   | rgb | i32 |...free...|
//!           0     4     8        16    19    23          capacity
//!  descriptors: [(i32,0,4) (i32,4,4) (f64,8,8) (Rgb,16,3) (i32,19,4)]
//! ```
//!
//! Values are packed back to back without alignment padding; typed access
//! always goes through unaligned copies. Descriptors partition `[0, used)`
//! contiguously in insertion order.

use crate::config::{BufferConfig, MAX_ALLOCATION};
use crate::descriptor::{BufferId, ValueDescriptor};
use crate::error::{BufferError, Result};
use crate::storable::{self, Storable};
use crate::type_key::TypeKey;
use crate::view::{check_type, ValueMut};
use std::fmt;

/// Width of one word in [`TypedBuffer::debug_dump`].
const DUMP_WORD: usize = 4;

/// Growable, append-only buffer of typed values.
pub struct TypedBuffer {
    id: BufferId,
    storage: Box<[u8]>,
    used: usize,
    descriptors: Vec<ValueDescriptor>,
    generation: u64,
    config: BufferConfig,
}

impl TypedBuffer {
    /// Empty buffer with the default configuration (no allocation).
    pub fn new() -> Self {
        Self::build(BufferConfig::default(), Box::default())
    }

    /// Empty buffer with a validated configuration.
    ///
    /// Fails on an invalid config or when `initial_capacity` cannot be
    /// allocated.
    pub fn with_config(config: BufferConfig) -> Result<Self> {
        config.validate()?;
        let storage = allocate(config.initial_capacity)?;
        Ok(Self::build(config, storage))
    }

    fn build(config: BufferConfig, storage: Box<[u8]>) -> Self {
        Self {
            id: BufferId::next(),
            storage,
            used: 0,
            descriptors: Vec::new(),
            generation: 0,
            config,
        }
    }

    /// Store `value` after the last stored value.
    ///
    /// Grows the storage first when `used + size_of::<T>() >= capacity`.
    /// Fails only if a configured `max_capacity` cannot accommodate the value,
    /// in which case the buffer is left untouched.
    pub fn append<T: Storable>(&mut self, value: T) -> Result<ValueDescriptor> {
        let key = TypeKey::of::<T>();
        let size = key.size();

        if self.used + size >= self.capacity() {
            self.expand(size)?;
        }

        let offset = self.descriptors.last().map_or(0, ValueDescriptor::end);
        debug_assert_eq!(offset, self.used);

        let descriptor = ValueDescriptor::new(key, offset, size, self.id);
        self.storage[offset..offset + size].copy_from_slice(storable::as_bytes(&value));
        self.descriptors.push(descriptor);
        self.used += size;

        log::trace!("[typebuf] buffer {} append {}", self.id, descriptor);
        Ok(descriptor)
    }

    /// Reallocate so that at least `minimum` more bytes fit.
    ///
    /// Doubles the capacity, falling back to `capacity + minimum` when doubling
    /// is not enough (always the case for the first allocation).
    fn expand(&mut self, minimum: usize) -> Result<()> {
        let capacity = self.capacity();
        let required = self.used.saturating_add(minimum);

        let mut target = capacity.saturating_mul(2);
        if target < capacity.saturating_add(minimum) {
            target = capacity.saturating_add(minimum);
        }

        let limit = self
            .config
            .max_capacity
            .map_or(MAX_ALLOCATION, |max| max.min(MAX_ALLOCATION));
        target = target.min(limit);
        if target < required {
            log::debug!(
                "[typebuf] buffer {} growth refused: {} bytes needed, limit {}",
                self.id,
                required,
                limit
            );
            return Err(BufferError::CapacityExceeded {
                requested: required,
                limit,
            });
        }

        if target == capacity {
            // Already at the limit and the value still fits exactly.
            return Ok(());
        }

        let mut storage = allocate(target)?;
        storage[..self.used].copy_from_slice(&self.storage[..self.used]);
        self.storage = storage;
        self.generation += 1;

        log::debug!(
            "[typebuf] buffer {} grew {} -> {} bytes (generation {})",
            self.id,
            capacity,
            target,
            self.generation
        );
        Ok(())
    }

    fn check_descriptor(&self, descriptor: &ValueDescriptor) -> Result<()> {
        if descriptor.owner() != self.id {
            return Err(BufferError::ForeignDescriptor {
                descriptor_owner: descriptor.owner().as_u64(),
                buffer: self.id.as_u64(),
            });
        }
        match descriptor.offset().checked_add(descriptor.length()) {
            Some(end) if end <= self.used => Ok(()),
            _ => Err(BufferError::OutOfBounds {
                offset: descriptor.offset(),
                length: descriptor.length(),
                used: self.used,
            }),
        }
    }

    /// Read-only bytes of one stored value.
    pub fn raw(&self, descriptor: &ValueDescriptor) -> Result<&[u8]> {
        self.check_descriptor(descriptor)?;
        Ok(&self.storage[descriptor.offset()..descriptor.end()])
    }

    /// Mutable bytes of one stored value.
    ///
    /// The slice borrows the buffer, so it cannot outlive the next append
    /// (which may reallocate).
    pub fn raw_access(&mut self, descriptor: &ValueDescriptor) -> Result<&mut [u8]> {
        self.check_descriptor(descriptor)?;
        Ok(&mut self.storage[descriptor.offset()..descriptor.end()])
    }

    /// Mutable view with checked typed access.
    pub fn view(&mut self, descriptor: &ValueDescriptor) -> Result<ValueMut<'_>> {
        let descriptor = *descriptor;
        let bytes = self.raw_access(&descriptor)?;
        Ok(ValueMut::new(descriptor, bytes))
    }

    /// Copy a stored value out as a `T`.
    pub fn get<T: Storable>(&self, descriptor: &ValueDescriptor) -> Result<T> {
        check_type::<T>(descriptor)?;
        storable::read_from(self.raw(descriptor)?)
    }

    /// Overwrite a stored `T` in place.
    pub fn set<T: Storable>(&mut self, descriptor: &ValueDescriptor, value: T) -> Result<()> {
        check_type::<T>(descriptor)?;
        storable::write_to(self.raw_access(descriptor)?, &value)
    }

    /// Descriptors in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValueDescriptor> {
        self.descriptors.iter()
    }

    pub fn descriptors(&self) -> &[ValueDescriptor] {
        &self.descriptors
    }

    /// Descriptor of the `index`-th stored value.
    pub fn descriptor(&self, index: usize) -> Option<ValueDescriptor> {
        self.descriptors.get(index).copied()
    }

    /// Every stored `T`, copied out in insertion order.
    pub fn values_of<T: Storable>(&self) -> impl Iterator<Item = T> + '_ {
        let key = TypeKey::of::<T>();
        self.descriptors
            .iter()
            .filter(move |d| d.key() == key)
            // own descriptors lie inside `used`, and a matching key pins the
            // length to `size_of::<T>()`
            .map(move |d| storable::read_prefix::<T>(&self.storage[d.offset()..d.end()]))
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Allocated bytes.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes occupied by stored values.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    /// Number of reallocations so far. Cached raw pointers are stale once
    /// this changes; descriptors stay valid.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Used bytes as little-endian `i32` words read every `dump_stride` bytes.
    ///
    /// Ignores value boundaries and zero-pads windows that run past the used
    /// region. Developer aid only.
    pub fn debug_dump(&self) -> String {
        let used = &self.storage[..self.used];
        (0..used.len())
            .step_by(self.config.dump_stride)
            .map(|start| {
                let end = (start + DUMP_WORD).min(used.len());
                let mut word = [0u8; DUMP_WORD];
                word[..end - start].copy_from_slice(&used[start..end]);
                i32::from_le_bytes(word).to_string()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Zeroed storage of exactly `bytes`, reporting allocator failure as an error.
fn allocate(bytes: usize) -> Result<Box<[u8]>> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(bytes)
        .map_err(|_| BufferError::AllocationFailed { requested: bytes })?;
    storage.resize(bytes, 0u8);
    Ok(storage.into_boxed_slice())
}

impl Default for TypedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedBuffer")
            .field("id", &self.id)
            .field("len", &self.descriptors.len())
            .field("used", &self.used)
            .field("capacity", &self.storage.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<'a> IntoIterator for &'a TypedBuffer {
    type Item = &'a ValueDescriptor;
    type IntoIter = std::slice::Iter<'a, ValueDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
