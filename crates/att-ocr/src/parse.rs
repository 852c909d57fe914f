//! Turning OCR text into a weekly schedule.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use att_core::Day;
use regex::Regex;

use crate::OcrError;

/// Columns in OCR output are separated by runs of two or more spaces.
static COLUMN_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Extracts a schedule for `days` from recognized timetable text.
///
/// When `section` is given, only text after the first ` {section} ` marker is
/// read. Each line starting with a day name (any case) contributes the rest of
/// the line, split on column gaps and title-cased. A later line for the same
/// day replaces an earlier one. Days with no line get an empty schedule.
pub fn parse_timetable_text(
    text: &str,
    section: Option<&str>,
    days: &[Day],
) -> Result<BTreeMap<Day, Vec<String>>, OcrError> {
    let body = match section.map(str::trim).filter(|s| !s.is_empty()) {
        Some(section) => {
            let marker = format!(" {section} ");
            let Some((_, after)) = text.split_once(&marker) else {
                return Err(OcrError::SectionNotFound {
                    section: section.to_string(),
                });
            };
            after
        }
        None => text,
    };

    let mut schedule: BTreeMap<Day, Vec<String>> =
        days.iter().map(|day| (*day, Vec::new())).collect();

    for line in body.lines().map(str::trim) {
        let Some((day, rest)) = days.iter().find_map(|day| strip_day(line, *day)) else {
            continue;
        };
        let subjects: Vec<String> = COLUMN_GAP_RE
            .split(rest.trim())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(title_case)
            .collect();
        tracing::debug!(%day, count = subjects.len(), "parsed timetable line");
        schedule.insert(day, subjects);
    }

    Ok(schedule)
}

fn strip_day(line: &str, day: Day) -> Option<(Day, &str)> {
    let name = day.name();
    let prefix = line.get(..name.len())?;
    prefix
        .eq_ignore_ascii_case(name)
        .then(|| (day, &line[name.len()..]))
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
