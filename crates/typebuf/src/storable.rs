// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Storable` capability and byte conversions.
//!
//! A buffer relocates values by raw byte copy and never runs per-type
//! destruction, and handlers may overwrite a value's bytes through a raw
//! view. Both are only sound for plain-old-data, so only types implementing
//! [`Storable`] can be appended.

use crate::error::{BufferError, Result};
use std::mem::size_of;

/// Plain-old-data that can live in a [`TypedBuffer`](crate::TypedBuffer).
///
/// # Safety
///
/// Implementors must guarantee that the type:
/// - contains no padding bytes (every byte of `size_of::<Self>()` is
///   initialized),
/// - accepts every bit pattern as a valid value (so no `bool`, `char`,
///   enums, references or `NonZero*`),
/// - owns no external resources and has no drop glue (`Copy` enforces the
///   latter).
///
/// For user structs this usually means `#[repr(C)]` with fields that are
/// themselves `Storable` and laid out without gaps:
///
/// ```
/// use typebuf::Storable;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// #[repr(C)]
/// struct Color {
///     red: u8,
///     green: u8,
///     blue: u8,
/// }
///
/// // SAFETY: three u8 fields, no padding, any bit pattern is a valid color.
/// unsafe impl Storable for Color {}
/// ```
pub unsafe trait Storable: Copy + 'static {}

macro_rules! impl_storable {
    ($($t:ty),* $(,)?) => {
        $(
            // SAFETY: primitive integers and floats have no padding and accept
            // every bit pattern.
            unsafe impl Storable for $t {}
        )*
    };
}

impl_storable!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// SAFETY: arrays have no padding between elements, and an array of values
// accepting every bit pattern accepts every bit pattern.
unsafe impl<T: Storable, const N: usize> Storable for [T; N] {}

/// Raw bytes of a storable value.
pub fn as_bytes<T: Storable>(value: &T) -> &[u8] {
    // SAFETY: `value` is a valid reference to `size_of::<T>()` bytes and
    // `Storable` guarantees none of them are padding.
    unsafe { std::slice::from_raw_parts((value as *const T).cast::<u8>(), size_of::<T>()) }
}

/// Copy a `T` out of `bytes`, which must be exactly `size_of::<T>()` long.
pub(crate) fn read_from<T: Storable>(bytes: &[u8]) -> Result<T> {
    if bytes.len() != size_of::<T>() {
        return Err(BufferError::SizeMismatch {
            expected: size_of::<T>(),
            found: bytes.len(),
        });
    }
    Ok(read_prefix(bytes))
}

/// Copy a `T` out of the first `size_of::<T>()` bytes of `bytes`.
///
/// Panics if `bytes` is shorter than `T`.
pub(crate) fn read_prefix<T: Storable>(bytes: &[u8]) -> T {
    let bytes = &bytes[..size_of::<T>()];
    // SAFETY: the slice above is exactly `size_of::<T>()` bytes, `read_unaligned`
    // has no alignment requirement and `Storable` guarantees every bit pattern
    // is a valid `T`.
    unsafe { std::ptr::read_unaligned(bytes.as_ptr().cast::<T>()) }
}

/// Overwrite `bytes` with the bit pattern of `value`.
pub(crate) fn write_to<T: Storable>(bytes: &mut [u8], value: &T) -> Result<()> {
    if bytes.len() != size_of::<T>() {
        return Err(BufferError::SizeMismatch {
            expected: size_of::<T>(),
            found: bytes.len(),
        });
    }
    bytes.copy_from_slice(as_bytes(value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    #[repr(C)]
    struct Rgb {
        r: u8,
        g: u8,
        b: u8,
    }

    // SAFETY: three u8 fields, no padding.
    unsafe impl Storable for Rgb {}

    #[test]
    fn test_as_bytes_is_native_endian() {
        let value: u32 = 0x1234_5678;
        assert_eq!(as_bytes(&value), &value.to_ne_bytes());
    }

    #[test]
    fn test_read_unaligned_slice() {
        let mut raw = [0u8; 9];
        raw[1..9].copy_from_slice(&15.46f64.to_ne_bytes());
        let value: f64 = read_from(&raw[1..9]).expect("read f64");
        assert_eq!(value, 15.46);
    }

    #[test]
    fn test_read_prefix_ignores_trailing_bytes() {
        let raw = [7u8, 0, 0, 0, 0xAA, 0xBB];
        let value: u32 = read_prefix(&raw);
        assert_eq!(value, u32::from_ne_bytes([7, 0, 0, 0]));
    }

    #[test]
    fn test_read_rejects_wrong_length() {
        let raw = [0u8; 3];
        let err = read_from::<u32>(&raw).expect_err("short slice must fail");
        assert_eq!(
            err,
            BufferError::SizeMismatch {
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_write_struct_bytes() {
        let mut raw = [0u8; 3];
        write_to(&mut raw, &Rgb { r: 255, g: 0, b: 7 }).expect("write rgb");
        assert_eq!(raw, [255, 0, 7]);
        assert_eq!(
            read_from::<Rgb>(&raw).expect("read rgb"),
            Rgb { r: 255, g: 0, b: 7 }
        );
    }

    #[test]
    fn test_write_rejects_wrong_length() {
        let mut raw = [0u8; 8];
        assert!(write_to(&mut raw, &1u16).is_err());
        assert_eq!(raw, [0u8; 8]);
    }
}
