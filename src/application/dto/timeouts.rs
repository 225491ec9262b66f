//! # Operation Timeouts

use std::time::Duration;

/// ライフサイクル操作ごとのタイムアウト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();

        assert_eq!(timeouts.create, Duration::from_secs(1800));
        assert_eq!(timeouts.read, Duration::from_secs(300));
        assert_eq!(timeouts.update, Duration::from_secs(1800));
        assert_eq!(timeouts.delete, Duration::from_secs(1800));
    }
}
