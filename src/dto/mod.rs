//! Wire-level contracts shared with the backend and the realtime channel.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod envelope;
pub mod snapshot;

pub use envelope::{RealtimeEvent, parse_event};
pub use snapshot::{GameSnapshotDto, GameStatus, SnapshotError};

/// Render an epoch-milliseconds wire timestamp for logs and summaries.
pub fn format_epoch_ms(epoch_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_milliseconds_render_as_rfc3339() {
        assert_eq!(format_epoch_ms(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_epoch_ms(1_600_000_000_000), "2020-09-13T12:26:40Z");
    }

    #[test]
    fn unrepresentable_timestamps_fall_back() {
        assert_eq!(format_epoch_ms(i64::MAX), "invalid-timestamp");
    }
}
