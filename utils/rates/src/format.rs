//! Unit labels used by the `Display` implementations.

use std::borrow::Cow;
use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);
const MINUTE: Duration = Duration::from_secs(60);
const MILLISECOND: Duration = Duration::from_millis(1);

/// Label used as the denominator of a rate, e.g. the `s` in `12 blocks/s`.
pub fn time_unit(unit: Duration) -> Cow<'static, str> {
    match unit {
        SECOND => Cow::Borrowed("s"),
        MINUTE => Cow::Borrowed("min"),
        MILLISECOND => Cow::Borrowed("ms"),
        other => Cow::Owned(format!("{other:?}")),
    }
}

/// Label used to describe a trailing window, e.g. the `1s` in `(in the last 1s)`.
pub fn window_label(window: Duration) -> Cow<'static, str> {
    match window {
        SECOND => Cow::Borrowed("1s"),
        MINUTE => Cow::Borrowed("1min"),
        MILLISECOND => Cow::Borrowed("1ms"),
        other => Cow::Owned(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_unit_labels() {
        assert_eq!(time_unit(Duration::from_secs(1)), "s");
        assert_eq!(time_unit(Duration::from_secs(60)), "min");
        assert_eq!(time_unit(Duration::from_millis(1)), "ms");
        assert_eq!(time_unit(Duration::from_millis(100)), "100ms");
        assert_eq!(time_unit(Duration::from_secs(30)), "30s");
    }

    #[test]
    fn test_window_labels() {
        assert_eq!(window_label(Duration::from_secs(1)), "1s");
        assert_eq!(window_label(Duration::from_secs(60)), "1min");
        assert_eq!(window_label(Duration::from_millis(1)), "1ms");
        assert_eq!(window_label(Duration::from_millis(500)), "500ms");
    }
}
