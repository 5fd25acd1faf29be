// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Buffer configuration with validation and environment overrides.

use crate::error::{BufferError, Result};

/// Env var overriding [`BufferConfig::initial_capacity`].
pub const ENV_INITIAL_CAPACITY: &str = "TYPEBUF_INITIAL_CAPACITY";
/// Env var overriding [`BufferConfig::max_capacity`].
pub const ENV_MAX_CAPACITY: &str = "TYPEBUF_MAX_CAPACITY";
/// Env var overriding [`BufferConfig::dump_stride`].
pub const ENV_DUMP_STRIDE: &str = "TYPEBUF_DUMP_STRIDE";

/// Default stride of [`TypedBuffer::debug_dump`](crate::TypedBuffer::debug_dump).
pub const DEFAULT_DUMP_STRIDE: usize = 1;

/// Largest storage a buffer may allocate; `Vec` refuses anything above `isize::MAX`.
pub const MAX_ALLOCATION: usize = isize::MAX as usize;

/// Configuration for a [`TypedBuffer`](crate::TypedBuffer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Bytes allocated up front (default: 0, allocate on first append).
    pub initial_capacity: usize,
    /// Upper bound on capacity in bytes (default: unbounded).
    pub max_capacity: Option<usize>,
    /// Byte step between words printed by the debug dump (default: 1, a word at every byte).
    pub dump_stride: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            max_capacity: None,
            dump_stride: DEFAULT_DUMP_STRIDE,
        }
    }
}

impl BufferConfig {
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }

    pub fn with_max_capacity(mut self, bytes: usize) -> Self {
        self.max_capacity = Some(bytes);
        self
    }

    pub fn with_dump_stride(mut self, stride: usize) -> Self {
        self.dump_stride = stride;
        self
    }

    /// Defaults overridden by `TYPEBUF_*` environment variables, validated.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup(ENV_INITIAL_CAPACITY) {
            self.initial_capacity = parse_bytes(ENV_INITIAL_CAPACITY, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_CAPACITY) {
            self.max_capacity = Some(parse_bytes(ENV_MAX_CAPACITY, &v)?);
        }
        if let Some(v) = lookup(ENV_DUMP_STRIDE) {
            self.dump_stride = parse_bytes(ENV_DUMP_STRIDE, &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration. Returns Ok(()) if valid.
    pub fn validate(&self) -> Result<()> {
        if self.dump_stride == 0 {
            return Err(BufferError::InvalidConfig(
                "dump_stride must be > 0".into(),
            ));
        }
        if self.initial_capacity > MAX_ALLOCATION {
            return Err(BufferError::InvalidConfig(format!(
                "initial_capacity {} exceeds the allocation limit {}",
                self.initial_capacity, MAX_ALLOCATION
            )));
        }
        if let Some(max) = self.max_capacity {
            if max > MAX_ALLOCATION {
                return Err(BufferError::InvalidConfig(format!(
                    "max_capacity {} exceeds the allocation limit {}",
                    max, MAX_ALLOCATION
                )));
            }
            if self.initial_capacity > max {
                return Err(BufferError::InvalidConfig(format!(
                    "initial_capacity {} exceeds max_capacity {}",
                    self.initial_capacity, max
                )));
            }
        }
        Ok(())
    }
}

fn parse_bytes(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| BufferError::InvalidConfig(format!("{}={:?}: {}", name, raw, e)))
}
