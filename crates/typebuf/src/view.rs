// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mutable view onto one stored value.

use crate::descriptor::ValueDescriptor;
use crate::error::{BufferError, Result};
use crate::storable::{self, Storable};
use crate::type_key::TypeKey;

/// Check that `descriptor` holds a `T` before reinterpreting its bytes.
pub(crate) fn check_type<T: Storable>(descriptor: &ValueDescriptor) -> Result<()> {
    let requested = TypeKey::of::<T>();
    let stored = descriptor.key();
    if stored != requested {
        return Err(BufferError::TypeMismatch {
            expected: requested.name(),
            found: stored.name(),
        });
    }
    if descriptor.length() != requested.size() {
        return Err(BufferError::SizeMismatch {
            expected: requested.size(),
            found: descriptor.length(),
        });
    }
    Ok(())
}

/// Raw, mutable access to exactly one value's bytes.
///
/// Handed to dispatch handlers. Typed accessors verify the stored type key and
/// byte length first and copy through unaligned reads/writes, so the view
/// never produces a misaligned or mistyped reference into the buffer.
#[derive(Debug)]
pub struct ValueMut<'a> {
    descriptor: ValueDescriptor,
    bytes: &'a mut [u8],
}

impl<'a> ValueMut<'a> {
    pub(crate) fn new(descriptor: ValueDescriptor, bytes: &'a mut [u8]) -> Self {
        debug_assert_eq!(descriptor.length(), bytes.len());
        Self { descriptor, bytes }
    }

    pub fn descriptor(&self) -> ValueDescriptor {
        self.descriptor
    }

    pub fn key(&self) -> TypeKey {
        self.descriptor.key()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &*self.bytes
    }

    /// Raw bytes. Any pattern written here is a valid value because stored
    /// types are [`Storable`].
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }

    /// True if the stored value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.descriptor.key() == TypeKey::of::<T>()
    }

    /// Copy the value out as a `T`.
    pub fn read<T: Storable>(&self) -> Result<T> {
        check_type::<T>(&self.descriptor)?;
        storable::read_from(&*self.bytes)
    }

    /// Overwrite the value with `value`.
    pub fn write<T: Storable>(&mut self, value: T) -> Result<()> {
        check_type::<T>(&self.descriptor)?;
        storable::write_to(&mut *self.bytes, &value)
    }

    /// Run `f` on the value and persist whatever it leaves behind.
    pub fn with<T: Storable, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut value = self.read::<T>()?;
        let out = f(&mut value);
        storable::write_to(&mut *self.bytes, &value)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::BufferId;

    fn view_of<T: Storable>(value: T, raw: &mut Vec<u8>) -> ValueMut<'_> {
        *raw = storable::as_bytes(&value).to_vec();
        let desc = ValueDescriptor::new(TypeKey::of::<T>(), 0, raw.len(), BufferId::next());
        ValueMut::new(desc, raw.as_mut_slice())
    }

    #[test]
    fn test_read_matching_type() {
        let mut raw = Vec::new();
        let view = view_of(42i32, &mut raw);
        assert!(view.is::<i32>());
        assert_eq!(view.read::<i32>().expect("read i32"), 42);
    }

    #[test]
    fn test_read_same_size_other_type_rejected() {
        let mut raw = Vec::new();
        let view = view_of(42i32, &mut raw);
        assert!(!view.is::<u32>());
        assert!(matches!(
            view.read::<u32>(),
            Err(BufferError::TypeMismatch { .. })
        ));
        assert!(matches!(
            view.read::<f32>(),
            Err(BufferError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let mut raw = Vec::new();
        let mut view = view_of(1.5f64, &mut raw);
        view.write(-2.25f64).expect("write f64");
        assert_eq!(view.read::<f64>().expect("read f64"), -2.25);
        assert!(view.write(7u8).is_err());
    }

    #[test]
    fn test_with_persists_changes() {
        let mut raw = Vec::new();
        let mut view = view_of([1u16, 2, 3], &mut raw);
        let sum = view
            .with::<[u16; 3], u16>(|arr| {
                arr[1] = 20;
                arr.iter().sum()
            })
            .expect("with array");
        assert_eq!(sum, 24);
        assert_eq!(view.read::<[u16; 3]>().expect("read array"), [1, 20, 3]);
    }

    #[test]
    fn test_bytes_mut_visible_to_read() {
        let mut raw = Vec::new();
        let mut view = view_of(0u32, &mut raw);
        view.bytes_mut().copy_from_slice(&7u32.to_ne_bytes());
        assert_eq!(view.read::<u32>().expect("read u32"), 7);
        assert_eq!(view.len(), 4);
        assert!(!view.is_empty());
    }
}
