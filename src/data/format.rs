use chrono::{DateTime, Local};

const MAGNITUDES: &[(f64, &str)] = &[(1e12, "t"), (1e9, "b"), (1e6, "m"), (1e3, "k")];

fn wrap_negative(negative: bool, body: String) -> String {
    if negative {
        format!("({})", body)
    } else {
        body
    }
}

/// `$ 265.5950 b` style: abbreviated magnitude, four decimals, negatives in parentheses.
pub fn compact_currency(value: f64) -> String {
    let magnitude = value.abs();
    let body = match MAGNITUDES.iter().find(|(threshold, _)| magnitude >= *threshold) {
        Some((threshold, suffix)) => format!("$ {:.4} {}", magnitude / threshold, suffix),
        None => format!("$ {:.4}", magnitude),
    };
    wrap_negative(value < 0.0, body)
}

/// `$ 123.45`, negatives in parentheses.
pub fn currency(value: f64) -> String {
    wrap_negative(value < 0.0, format!("$ {:.2}", value.abs()))
}

/// Ratio to percentage with two decimals: `0.1234` becomes `12.34%`.
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn local_time(epoch_millis: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(epoch_millis).map(|utc| utc.with_timezone(&Local))
}

pub fn local_date(epoch_millis: i64) -> Option<String> {
    local_time(epoch_millis).map(|t| t.format("%-m/%-d/%Y").to_string())
}

pub fn local_datetime(epoch_millis: i64) -> Option<String> {
    local_time(epoch_millis).map(|t| t.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string())
}

pub fn now_local() -> String {
    Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_currency_magnitudes() {
        assert_eq!(compact_currency(265_595_000_000.0), "$ 265.5950 b");
        assert_eq!(compact_currency(14_236_000_000.0), "$ 14.2360 b");
        assert_eq!(compact_currency(2_500_000.0), "$ 2.5000 m");
        assert_eq!(compact_currency(1_234.5), "$ 1.2345 k");
        assert_eq!(compact_currency(3_100_000_000_000.0), "$ 3.1000 t");
        assert_eq!(compact_currency(12.0), "$ 12.0000");
    }

    #[test]
    fn test_compact_currency_negative() {
        assert_eq!(compact_currency(-1_500_000.0), "($ 1.5000 m)");
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency(187.456), "$ 187.46");
        assert_eq!(currency(0.0), "$ 0.00");
        assert_eq!(currency(-3.1), "($ 3.10)");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.1234), "12.34%");
        assert_eq!(percent(-0.05), "-5.00%");
    }

    #[test]
    fn test_local_date_is_present_for_valid_millis() {
        assert!(local_date(1_546_300_800_000).is_some());
        assert!(local_datetime(1_546_300_800_000).unwrap().contains(", "));
    }
}
