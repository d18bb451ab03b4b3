//! Content types and their allocation
//!
//! A content type names a partition kind of document text (default code,
//! comment, string literal and so on). The engine never discovers
//! partitioning itself; callers allocate content types up front and wire
//! them into transition rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Opaque identifier of a partition kind.
///
/// Two values are reserved: [`ContentType::DEFAULT`] for the outermost
/// partition and [`ContentType::PARENT`] meaning "inherit from the enclosing
/// partition". All other values come from a [`ContentTypeAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentType(u32);

impl ContentType {
    /// The default (outermost) content.
    pub const DEFAULT: ContentType = ContentType(0);
    /// The content of the enclosing partition (the transition source).
    pub const PARENT: ContentType = ContentType(u32::MAX);

    /// Rebuild a value previously obtained from [`Self::as_u32`].
    pub fn from_u32(value: u32) -> Self {
        ContentType(value)
    }

    /// Raw value, for diagnostics only.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ContentType::DEFAULT => write!(f, "content#default"),
            ContentType::PARENT => write!(f, "content#parent"),
            ContentType(v) => write!(f, "content#{}", v),
        }
    }
}

/// Allocation errors for content types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("content type space exhausted")]
    Exhausted,
}

/// Hands out process-unique content type values.
///
/// The allocator is the only shared-mutable state in the engine. Allocation
/// uses an atomic counter so documents and partitioners on different threads
/// can allocate concurrently; comparing already-allocated values needs no
/// synchronization at all.
///
/// Tests construct their own allocators to get deterministic sequences; a
/// process normally shares one instance.
#[derive(Debug)]
pub struct ContentTypeAllocator {
    next: AtomicU32,
}

impl ContentTypeAllocator {
    /// Create an allocator whose first value follows [`ContentType::DEFAULT`].
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(ContentType::DEFAULT.0 + 1),
        }
    }

    /// Allocate a fresh, unique content type.
    pub fn allocate(&self) -> Result<ContentType, AllocationError> {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        // u32::MAX is the PARENT sentinel; refuse to hand it out.
        if value >= ContentType::PARENT.0 {
            self.next.store(ContentType::PARENT.0, Ordering::Relaxed);
            return Err(AllocationError::Exhausted);
        }
        Ok(ContentType(value))
    }
}

impl Default for ContentTypeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(ContentType::DEFAULT, ContentType::PARENT);
    }

    #[test]
    fn test_allocation_is_sequential_and_unique() {
        let allocator = ContentTypeAllocator::new();
        let a = allocator.allocate().unwrap();
        let b = allocator.allocate().unwrap();
        assert_ne!(a, b);
        assert_ne!(a, ContentType::DEFAULT);
        assert_ne!(b, ContentType::PARENT);
    }

    #[test]
    fn test_concurrent_allocation_yields_distinct_values() {
        let allocator = Arc::new(ContentTypeAllocator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let allocator = Arc::clone(&allocator);
            handles.push(std::thread::spawn(move || {
                (0..100)
                    .map(|_| allocator.allocate().unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for ct in handle.join().unwrap() {
                assert_ne!(ct, ContentType::DEFAULT);
                assert_ne!(ct, ContentType::PARENT);
                assert!(seen.insert(ct), "duplicate content type {}", ct);
            }
        }
        assert_eq!(seen.len(), 800);
    }
}
