//! Shared constants for multi-mesh traversal.
//!
//! # Parametric Space
//!
//! Every base element is addressed through a normalized fixed-point window,
//! independent of its real-space geometry:
//!
//! ```text
//!   (0, ONE)                 (ONE, ONE)
//!       ┌───────────┬───────────┐
//!       │           │           │
//!       │  3 (TL)   │  2 (TR)   │      5 = top half      (b = vmid)
//!       │           │           │      4 = bottom half   (t = vmid)
//!       ├───────────┼───────────┤ vmid
//!       │           │           │      6 = left half     (r = hmid)
//!       │  0 (BL)   │  1 (BR)   │      7 = right half    (l = hmid)
//!       │           │           │
//!       └───────────┴───────────┘
//!   (0, 0)        hmid       (ONE, 0)
//! ```
//!
//! # Transform Code Layout
//!
//! ```text
//! code = (s1 + 1)·8^(k-1) + ... + (sk + 1)·8^0
//!        └─ oldest step         └─ most recent step
//! ```
//!
//! Digits run 1..=8 (bijective base 8), so decoding always goes through
//! `code - 1` and the empty code is 0. The deepest all-`7` path that still
//! fits in 64 bits is [`MAX_CODE_DEPTH`] long.

/// Side length of the parametric unit square.
///
/// Leaves two bits of headroom so midpoint arithmetic can never overflow.
pub const PARAM_ONE: u64 = 1 << 62;

/// Bits used per level of a transform code.
pub const CODE_BITS_PER_LEVEL: u32 = 3;

/// Deepest virtual path a transform code can hold.
pub const MAX_CODE_DEPTH: usize = (u64::BITS / CODE_BITS_PER_LEVEL) as usize;

/// Default number of frames a traversal cursor may hold at once.
pub const DEFAULT_STACK_CAPACITY: usize = 256;

/// Base-element areas must agree within `min_base_area / divisor`.
pub const DEFAULT_AREA_TOLERANCE_DIVISOR: f64 = 100.0;

/// First allocation of each union mapping table (doubled on demand).
pub const UNION_TABLE_INITIAL_SIZE: usize = 1024;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
