//! Finds calendar dates mentioned in free-form text.
//!
//! The scanner recognises the common written forms handled by datefinder and
//! dateutil: ISO dates, numeric month-first dates, and month-name dates with
//! optional weekday, ordinal, year, time of day and timezone. Fields a match
//! leaves out are taken from a base date, and a missing time is midnight.

use chrono::{Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cmp::Reverse;

const WEEKDAY: &str = r"(?:(?:mon|tues?|wed(?:nes)?|thu(?:rs?)?|fri|sat(?:ur)?|sun)(?:day)?\b\.?,?\s+)?";

const MONTH: &str = r"(?P<month>jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";

const TIME: &str = r"(?:,?\s+(?:at\s+)?(?P<time>\d{1,2}:\d{2}\b(?::\d{2}\b)?(?:\s*[ap]\.?m\b\.?)?|\d{1,2}\s*[ap]\.?m\b\.?)(?:\s*(?P<tz>(?:utc|gmt|[ecmp][sd]t)\b))?)?";

// A time written ahead of the date: "3pm on May 5", "10:30 12/01/2024".
const PRETIME: &str = r"(?:(?P<pretime>\d{1,2}(?::\d{2})?\s*[ap]\.?m\b\.?|\d{1,2}:\d{2}\b)\s+(?:on\s+)?)?";

// Compiled once; each pattern yields year/month/day groups (or a/b for
// numeric dates) plus an optional time.
static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let sources = [
        // 2024-05-01, 2024/05/01, 2024.05.01, 2024-05-01T09:30Z, 2024-05-01 09:30:00
        format!(r"(?i)\b{PRETIME}(?P<year>\d{{4}})[-/.](?P<month>\d{{1,2}})[-/.](?P<day>\d{{1,2}})(?:T(?:(?P<isotime>\d{{1,2}}:\d{{2}}(?::\d{{2}})?)(?P<isotz>z|[+-]\d{{2}}:?\d{{2}})?\b)?|\b{TIME})"),
        // 05/01/2024, 5-1-24, 5.1.2024
        format!(r"(?i)\b{PRETIME}(?P<a>\d{{1,2}})[/.-](?P<b>\d{{1,2}})[/.-](?P<year>\d{{4}}|\d{{2}})\b{TIME}"),
        // Tuesday, May 7th, 2024 at 3pm
        format!(r"(?i)\b{PRETIME}{WEEKDAY}{MONTH}\s+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(?P<year>\d{{4}})\b)?{TIME}"),
        // 7th of May 2024
        format!(r"(?i)\b{PRETIME}{WEEKDAY}(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH}(?:,?\s+(?P<year>\d{{4}})\b)?{TIME}"),
        // May 2024
        format!(r"(?i)\b{PRETIME}{MONTH},?\s+(?P<year>\d{{4}})\b"),
    ];

    sources
        .iter()
        .map(|source| Regex::new(source).expect("Failed to compile date pattern"))
        .collect()
});

static TIME_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?(?::(?P<second>\d{2}))?\s*(?:(?P<meridiem>[ap])\.?m\.?)?$")
        .expect("Failed to compile time pattern")
});

/// A date found in the input, with the byte span of its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub value: NaiveDateTime,
    /// Set when the text names a timezone or UTC offset.
    pub offset: Option<FixedOffset>,
    pub start: usize,
    pub end: usize,
}

impl DateMatch {
    /// Renders the date as `YYYY-MM-DD HH:MM:SS`, followed by `+HH:MM` when
    /// the match carries an offset.
    pub fn formatted(&self) -> String {
        let local = self.value.format("%Y-%m-%d %H:%M:%S").to_string();
        match self.offset {
            Some(offset) => format!("{}{}", local, offset),
            None => local,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateFinder {
    /// Supplies missing year/day fields; `None` means today.
    pub base_date: Option<NaiveDate>,
}

impl DateFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_date(base_date: NaiveDate) -> Self {
        Self { base_date: Some(base_date) }
    }

    /// Returns every date in `text`, ordered by position and never overlapping.
    pub fn find_dates(&self, text: &str) -> Vec<DateMatch> {
        let base = self.base_date.unwrap_or_else(|| Local::now().date_naive());

        let mut candidates: Vec<DateMatch> = PATTERNS
            .iter()
            .flat_map(|pattern| pattern.captures_iter(text))
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let (value, offset) = resolve(&caps, base)?;
                Some(DateMatch { value, offset, start: whole.start(), end: whole.end() })
            })
            .collect();

        candidates.sort_by_key(|m| (m.start, Reverse(m.end)));

        let mut matches: Vec<DateMatch> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if matches.last().is_some_and(|last| candidate.start < last.end) {
                continue;
            }
            matches.push(candidate);
        }
        matches
    }
}

fn resolve(caps: &Captures, base: NaiveDate) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let year = match caps.name("year") {
        Some(y) if y.as_str().len() <= 2 => expand_two_digit_year(y.as_str().parse().ok()?, base.year()),
        Some(y) => y.as_str().parse().ok()?,
        None => base.year(),
    };

    let (month, day) = match (caps.name("a"), caps.name("b")) {
        (Some(a), Some(b)) => {
            let a: u32 = a.as_str().parse().ok()?;
            let b: u32 = b.as_str().parse().ok()?;
            if a > 12 && b <= 12 { (b, a) } else { (a, b) }
        }
        _ => {
            let month = parse_month(caps.name("month")?.as_str())?;
            let day = match caps.name("day") {
                Some(d) => d.as_str().parse().ok()?,
                None => base.day().min(days_in_month(year, month)?),
            };
            (month, day)
        }
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = match caps
        .name("isotime")
        .or_else(|| caps.name("time"))
        .or_else(|| caps.name("pretime"))
    {
        Some(t) => parse_time(t.as_str())?,
        None => NaiveTime::MIN,
    };
    let offset = match caps.name("isotz").or_else(|| caps.name("tz")) {
        Some(tz) => Some(parse_offset(tz.as_str())?),
        None => None,
    };
    Some((date.and_time(time), offset))
}

fn parse_month(value: &str) -> Option<u32> {
    if let Ok(number) = value.parse::<u32>() {
        return Some(number);
    }
    let prefix = value.get(..3)?.to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let caps = TIME_PARTS.captures(value.trim())?;
    let mut hour: u32 = caps.name("hour")?.as_str().parse().ok()?;
    let minute = caps.name("minute").map_or(Some(0), |m| m.as_str().parse().ok())?;
    let second = caps.name("second").map_or(Some(0), |s| s.as_str().parse().ok())?;

    if let Some(meridiem) = caps.name("meridiem") {
        if hour == 0 || hour > 12 {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("p");
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Resolves `Z`, `UTC`/`GMT`, US zone abbreviations and `+HH:MM` offsets.
fn parse_offset(value: &str) -> Option<FixedOffset> {
    let hours = match value.to_ascii_lowercase().as_str() {
        "z" | "utc" | "gmt" => 0,
        "edt" => -4,
        "est" | "cdt" => -5,
        "cst" | "mdt" => -6,
        "mst" | "pdt" => -7,
        "pst" => -8,
        numeric => {
            let sign = if numeric.starts_with('-') { -1 } else { 1 };
            let digits: String = numeric.get(1..)?.chars().filter(char::is_ascii_digit).collect();
            let h: i32 = digits.get(..2)?.parse().ok()?;
            let m: i32 = digits.get(2..4)?.parse().ok()?;
            if h > 23 || m > 59 {
                return None;
            }
            return FixedOffset::east_opt(sign * (h * 3600 + m * 60));
        }
    };
    FixedOffset::east_opt(hours * 3600)
}

/// Places a two-digit year in the century that keeps it within fifty years
/// of `base_year`.
fn expand_two_digit_year(year: i32, base_year: i32) -> i32 {
    let year = base_year / 100 * 100 + year;
    if year >= base_year + 50 {
        year - 100
    } else if year < base_year - 50 {
        year + 100
    } else {
        year
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month.checked_add(1)?) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}
