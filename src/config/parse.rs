use std::time::Duration;

/// Parses `500ms`, `20s`, `10m` or `1h`; a bare number means seconds.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Duration must not be empty.".to_owned());
    }

    let split = value
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    if digits.is_empty() {
        return Err(format!("Invalid duration '{}'.", value));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|err| format!("Invalid duration '{}': {}", value, err))?;

    let duration = match unit {
        "ms" => Duration::from_millis(amount),
        "" | "s" => Duration::from_secs(amount),
        "m" => Duration::from_secs(scale(amount, 60)?),
        "h" => Duration::from_secs(scale(amount, 3_600)?),
        other => return Err(format!("Invalid duration unit '{}'.", other)),
    };

    if duration.is_zero() {
        return Err("Duration must be > 0.".to_owned());
    }
    Ok(duration)
}

fn scale(amount: u64, seconds_per_unit: u64) -> Result<u64, String> {
    amount
        .checked_mul(seconds_per_unit)
        .ok_or_else(|| "Duration overflow.".to_owned())
}
