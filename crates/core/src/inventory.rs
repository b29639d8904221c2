//! Inventory

use std::fmt;

/// Whether stock covers a requested quantity.
pub fn can_satisfy(available: u32, requested: u32) -> bool {
    available >= requested
}

/// Stock position of a requested quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Enough stock for the requested quantity.
    InStock,

    /// Some stock, but less than requested.
    Limited(u32),

    /// Nothing left.
    OutOfStock,
}

impl Availability {
    /// Classifies a requested quantity against available stock.
    pub fn of(available: u32, requested: u32) -> Self {
        if available == 0 {
            Self::OutOfStock
        } else if can_satisfy(available, requested) {
            Self::InStock
        } else {
            Self::Limited(available)
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InStock => f.write_str("In Stock"),
            Self::Limited(available) => write!(f, "Only {available} available"),
            Self::OutOfStock => f.write_str("Out of Stock"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_satisfy_exact_stock() {
        assert!(can_satisfy(5, 5));
        assert!(!can_satisfy(5, 6));
    }

    #[test]
    fn availability_classifies_stock() {
        assert_eq!(Availability::of(0, 1), Availability::OutOfStock);
        assert_eq!(Availability::of(3, 5), Availability::Limited(3));
        assert_eq!(Availability::of(5, 5), Availability::InStock);
    }

    #[test]
    fn availability_display() {
        assert_eq!(Availability::Limited(2).to_string(), "Only 2 available");
    }
}
