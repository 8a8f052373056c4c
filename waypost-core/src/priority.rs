//! Sibling ordering.

use std::fmt;
use std::ops::{Add, Sub};

/// The rank of a node among its siblings.
///
/// Higher priorities are asked first. Siblings with equal priority are asked in
/// the order they were attached.
///
/// The domain is open: any `i32` is a legal priority, so callers can slot a
/// node between the named tiers.
///
/// ```rust,ignore
/// let just_below_high = Priority::HIGH - 1;
/// assert!(just_below_high < Priority::HIGH);
/// assert!(just_below_high > Priority::MEDIUM);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i32);

impl Priority {
    /// A high priority. Equal to 1000.
    pub const HIGH: Self = Self(1000);

    /// A medium priority. Equal to 500.
    pub const MEDIUM: Self = Self(500);

    /// A low priority. Equal to 100.
    pub const LOW: Self = Self(100);

    /// The rank of "ask my parent". Equal to 0.
    pub const PARENT: Self = Self(0);

    /// Create a priority from a raw value.
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// The raw value.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl Add<i32> for Priority {
    type Output = Self;

    fn add(self, rhs: i32) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub<i32> for Priority {
    type Output = Self;

    fn sub(self, rhs: i32) -> Self {
        Self(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::HIGH => f.write_str("high"),
            Self::MEDIUM => f.write_str("medium"),
            Self::LOW => f.write_str("low"),
            Self::PARENT => f.write_str("parent"),
            Self(value) => write!(f, "{value}"),
        }
    }
}
