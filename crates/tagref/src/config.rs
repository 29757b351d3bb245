//! Growth policy configuration for growable arrays

/// Configuration for how a [`Stack`](crate::Stack) grows.
///
/// A full array doubles its capacity; an empty one jumps straight to
/// `initial_capacity`. Growth past `max_capacity` fails with
/// [`StackError::CapacityOverflow`](crate::StackError::CapacityOverflow)
/// instead of reallocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    /// Capacity used for the first growth of an empty array
    pub initial_capacity: u32,

    /// Upper bound on capacity (`u32::MAX` is reserved as an index sentinel)
    pub max_capacity: u32,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 2,
            max_capacity: u32::MAX - 1,
        }
    }
}

impl StackConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity of the first growth (clamped to at least 1).
    pub fn with_initial_capacity(mut self, initial_capacity: u32) -> Self {
        self.initial_capacity = initial_capacity.max(1);
        self
    }

    /// Set the capacity limit (clamped below the reserved index).
    pub fn with_max_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = max_capacity.min(u32::MAX - 1);
        self
    }

    /// Capacity to grow to from `capacity`, or `None` when growth is impossible.
    pub fn next_capacity(&self, capacity: u32) -> Option<u32> {
        if capacity >= self.max_capacity {
            return None;
        }
        let desired = match capacity {
            0 => self.initial_capacity,
            _ => capacity.checked_mul(2)?,
        };
        Some(desired.min(self.max_capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_doubles_from_two() {
        let config = StackConfig::default();
        assert_eq!(config.next_capacity(0), Some(2));
        assert_eq!(config.next_capacity(2), Some(4));
        assert_eq!(config.next_capacity(4), Some(8));
    }

    #[test]
    fn test_doubling_overflow() {
        let config = StackConfig::default();
        assert_eq!(config.next_capacity(1 << 31), None);
    }

    #[test]
    fn test_max_capacity_clamps_then_stops() {
        let config = StackConfig::new().with_max_capacity(5);
        assert_eq!(config.next_capacity(4), Some(5));
        assert_eq!(config.next_capacity(5), None);
    }

    #[test]
    fn test_initial_capacity_clamped() {
        let config = StackConfig::new().with_initial_capacity(0);
        assert_eq!(config.initial_capacity, 1);
        assert_eq!(config.next_capacity(0), Some(1));
    }

    #[test]
    fn test_max_capacity_excludes_sentinel() {
        let config = StackConfig::new().with_max_capacity(u32::MAX);
        assert_eq!(config.max_capacity, u32::MAX - 1);
    }
}
