//! Text helpers used by the page templates

use chrono::DateTime;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3600.0;
const DAY: f64 = 86_400.0;
const WEEK: f64 = 604_800.0;

/// HTML-escape text for element content and quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One `<p>` per non-blank line, escaped.
pub fn text_to_html(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect()
}

fn ago(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Relative time for the last week, the calendar date after that.
pub fn datetime_filter(ts: f64, now: f64) -> String {
    let delta = (now - ts).max(0.0);
    if delta < MINUTE {
        return ago(1, "minute");
    }
    if delta < HOUR {
        return ago((delta / MINUTE) as u64, "minute");
    }
    if delta < DAY {
        return ago((delta / HOUR) as u64, "hour");
    }
    if delta < WEEK {
        return ago((delta / DAY) as u64, "day");
    }
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn paragraphs_skip_blank_lines() {
        assert_eq!(
            text_to_html("first\n\n  \nsecond <b>\n"),
            "<p>first</p><p>second &lt;b&gt;</p>"
        );
        assert_eq!(text_to_html(""), "");
    }

    #[test]
    fn relative_times() {
        let now = 1_700_000_000.0;
        assert_eq!(datetime_filter(now - 5.0, now), "1 minute ago");
        assert_eq!(datetime_filter(now - 150.0, now), "2 minutes ago");
        assert_eq!(datetime_filter(now - 3.0 * HOUR, now), "3 hours ago");
        assert_eq!(datetime_filter(now - DAY - 1.0, now), "1 day ago");
        assert_eq!(datetime_filter(now - 6.0 * DAY, now), "6 days ago");
    }

    #[test]
    fn older_than_a_week_shows_date() {
        assert_eq!(datetime_filter(0.0, 30.0 * DAY), "1970-01-01");
    }

    #[test]
    fn future_timestamps_clamp() {
        assert_eq!(datetime_filter(100.0, 0.0), "1 minute ago");
    }
}
