use std::time::{SystemTime, UNIX_EPOCH};

fn since_epoch() -> std::time::Duration {
    // A clock before 1970 is treated as the epoch itself
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Current Unix timestamp in seconds
pub fn current_timestamp_secs() -> i64 {
    since_epoch().as_secs() as i64
}

/// Current Unix timestamp in milliseconds
///
/// Email hashes are signed over a millisecond timestamp.
pub fn current_timestamp_millis() -> i64 {
    since_epoch().as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_current_timestamp_secs() {
        let ts1 = current_timestamp_secs();
        assert!(ts1 > 1_700_000_000);

        thread::sleep(Duration::from_millis(20));
        assert!(current_timestamp_secs() >= ts1);
    }

    #[test]
    fn test_timestamp_relationship() {
        let secs = current_timestamp_secs();
        let millis = current_timestamp_millis();

        let diff = (millis - secs * 1000).abs();
        assert!(diff < 1000, "Timestamp mismatch too large: {}", diff);
    }
}
