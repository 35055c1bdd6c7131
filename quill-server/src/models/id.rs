//! Primary key and timestamp generators

use chrono::Utc;
use uuid::Uuid;

use crate::orm::SqlValue;

/// Time-sortable 50-character id: 15-digit millisecond timestamp,
/// 32 hex digits of a v4 uuid, then `000`.
pub fn next_id() -> String {
    format!(
        "{:015}{}000",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Seconds since the epoch with sub-second precision.
pub fn now_ts() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

pub(crate) fn next_id_value() -> SqlValue {
    SqlValue::Text(next_id())
}

pub(crate) fn now_value() -> SqlValue {
    SqlValue::Double(now_ts())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_shape() {
        let id = next_id();
        assert_eq!(id.len(), 50);
        assert!(id.ends_with("000"));
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!id.contains('-'));
    }

    #[test]
    fn ids_sort_by_time() {
        let a = next_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = next_id();
        assert!(a[..15] < b[..15]);
    }

    #[test]
    fn timestamp_is_recent() {
        let ts = now_ts();
        assert!(ts > 1_600_000_000.0);
    }
}
