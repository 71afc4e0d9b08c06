//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Locale};
use chrono_tz::Tz;

use crate::config::DateConfig;

/// Formats CMS timestamps for display
#[derive(Debug, Clone)]
pub struct DateFormatter {
    locale: Locale,
    chrono_format: String,
    timezone: Tz,
}

impl DateFormatter {
    /// Build a formatter from the `date` section of the site config
    pub fn new(config: &DateConfig) -> Result<Self> {
        let locale_name = config.locale.replace('-', "_");
        let locale = Locale::try_from(locale_name.as_str())
            .map_err(|_| anyhow!("Unknown date locale: {}", config.locale))?;
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| anyhow!("Unknown timezone: {}", config.timezone))?;

        Ok(Self {
            locale,
            chrono_format: date_fns_to_chrono_format(&config.pattern),
            timezone,
        })
    }

    /// Format a CMS timestamp, `None` when it cannot be parsed
    ///
    /// # Examples
    /// ```ignore
    /// fmt.format("2021-03-15T00:00:00Z") // -> Some("15 mar 2021") with pt_BR
    /// ```
    pub fn format(&self, raw: &str) -> Option<String> {
        let date = parse_timestamp(raw)?.with_timezone(&self.timezone);
        Some(
            date.format_localized(&self.chrono_format, self.locale)
                .to_string(),
        )
    }

    /// Format an optional timestamp, empty when absent or invalid
    pub fn format_or_empty(&self, raw: Option<&str>) -> String {
        raw.and_then(|r| self.format(r)).unwrap_or_default()
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            locale: Locale::pt_BR,
            chrono_format: date_fns_to_chrono_format(&DateConfig::default().pattern),
            timezone: Tz::UTC,
        }
    }
}

/// Parse the timestamps the content API emits
///
/// Accepts RFC 3339 (`2021-03-15T00:00:00Z`) as well as the colon-less
/// offset form (`2021-03-25T19:25:28+0000`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Machine readable value for `<time datetime="...">`
pub fn datetime_attr(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|d| d.to_rfc3339())
        .unwrap_or_default()
}

/// Convert a date-fns format pattern to a chrono format string
///
/// Letters are grouped into runs (`dd`, `MMM`, `yyyy`); text inside single
/// quotes is copied literally.
fn date_fns_to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut result = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // Quoted literal, '' is an escaped quote
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        result.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut result, c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let token = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('E', 4) => "%A",
            ('E', _) => "%a",
            ('a', _) => "%p",
            _ => "",
        };

        if token.is_empty() {
            for _ in 0..run {
                push_literal(&mut result, c);
            }
        } else {
            result.push_str(token);
        }
        i += run;
    }

    result
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
