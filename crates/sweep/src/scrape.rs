use crate::evaluator::MetricReading;

pub const TOTAL_RETURN_MARKER: &str = "Total Return";

/// Pulls the total return out of a rendered stats table.
///
/// Takes the first line containing `Total Return`, its third
/// whitespace-separated token, drops a trailing `%` and parses the rest.
/// Anything else (no such line, no third token, unparsable or non-finite
/// number) is [`MetricReading::Missing`].
pub fn scrape_total_return(text: &str) -> MetricReading {
    let Some(line) = text.lines().find(|l| l.contains(TOTAL_RETURN_MARKER)) else {
        return MetricReading::Missing;
    };

    let Some(token) = line.split_whitespace().nth(2) else {
        return MetricReading::Missing;
    };

    let number = token.strip_suffix('%').unwrap_or(token);
    match number.parse::<f64>() {
        Ok(v) if v.is_finite() => MetricReading::Reported(v),
        _ => MetricReading::Missing,
    }
}
