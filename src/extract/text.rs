//! Text cleanup shared by the page parsers
//!
//! Cell and infobox text on encyclopedia pages carries footnote markers,
//! hidden sort keys, non-breaking spaces and parenthesised qualifiers. The
//! helpers here turn that into plain values: names, titles, dates and
//! durations.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static FOOTNOTE: Lazy<Regex> = Lazy::new(|| static_regex(r"\[[^\]]*\]"));
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| static_regex(r"\([^)]*\)"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| static_regex(r"\s+"));
static NAME_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| static_regex(r"(?i)\s*(?:,|;|\n|&|\band\b)\s*"));

static ISO_DATE: Lazy<Regex> = Lazy::new(|| static_regex(r"\b(\d{4})-(\d{2})-(\d{2})\b"));
static MDY_DATE: Lazy<Regex> = Lazy::new(|| {
    static_regex(
        r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})\b",
    )
});
static DMY_DATE: Lazy<Regex> = Lazy::new(|| {
    static_regex(
        r"\b(\d{1,2})\s+(January|February|March|April|May|June|July|August|September|October|November|December),?\s+(\d{4})\b",
    )
});

static HOURS_DURATION: Lazy<Regex> = Lazy::new(|| {
    static_regex(r"(?i)\b(\d+)\s*(?:hours?|hrs?|h)\b[,\s]*(?:and\s+)?(?:(\d+)\s*(?:minutes?|mins?|m)\b)?")
});
static MINUTES_DURATION: Lazy<Regex> =
    Lazy::new(|| static_regex(r"(?i)\b(\d+)\s*(?:minutes?|mins?|min\.)"));

fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hard-coded pattern compiles")
}

/// Collapses whitespace, removes footnote markers and trims
pub fn clean_text(raw: &str) -> String {
    let without_notes = FOOTNOTE.replace_all(raw, "");
    let spaced = without_notes.replace('\u{a0}', " ");
    WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

/// Removes parenthesised qualifiers such as "(film)" or "(posthumous)"
pub fn strip_parentheticals(raw: &str) -> String {
    clean_text(&PARENTHETICAL.replace_all(raw, ""))
}

/// Visible text of an element
///
/// Footnote superscripts, hidden sort keys, styles and scripts are skipped.
/// Line breaks and list items become newlines before cleanup, so this
/// returns one line; use [`element_lines`] to keep the structure.
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&raw_text(element))
}

/// Visible text of an element split at `<br>`, list items and paragraphs
pub fn element_lines(element: ElementRef<'_>) -> Vec<String> {
    raw_text(element)
        .split('\n')
        .map(clean_text)
        .filter(|line| !line.is_empty())
        .collect()
}

fn raw_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if is_hidden(child) {
                continue;
            }
            let name = child.value().name();
            if name == "br" {
                out.push('\n');
                continue;
            }
            collect_text(child, out);
            if matches!(name, "li" | "p" | "div" | "dd") {
                out.push('\n');
            }
        }
    }
}

/// Footnotes, sort keys, styles and `display:none` content
pub(crate) fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();
    match value.name() {
        "style" | "script" => return true,
        "sup" if value.classes().any(|c| c == "reference" || c == "noprint") => return true,
        _ => {}
    }

    if value.classes().any(|c| c == "sortkey" || c == "mw-ref") {
        return true;
    }

    value
        .attr("style")
        .map(|style| style.replace(' ', "").contains("display:none"))
        .unwrap_or(false)
}

/// Splits a cell naming several people into one name per co-nominee
///
/// Separators are commas, semicolons, `&`, the word "and" and line breaks.
pub fn split_names(raw: &str) -> Vec<String> {
    NAME_SEPARATOR
        .split(raw)
        .map(strip_parentheticals)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Splits a display name into (first, middle, last)
///
/// One token gives a first name only; two give first and last; three or
/// more put every inner token into the middle name.
pub fn split_person_name(full_name: &str) -> (String, Option<String>, Option<String>) {
    let cleaned = strip_parentheticals(full_name);
    let parts: Vec<&str> = cleaned.split_whitespace().collect();

    match parts.as_slice() {
        [] => (String::new(), None, None),
        [first] => (first.to_string(), None, None),
        [first, last] => (first.to_string(), None, Some(last.to_string())),
        [first, middle @ .., last] => (
            first.to_string(),
            Some(middle.join(" ")),
            Some(last.to_string()),
        ),
    }
}

/// Finds the first unambiguous full date in free text
///
/// Accepted forms are ISO `1972-03-15`, `March 15, 1972` and
/// `15 March 1972`. Purely numeric day/month forms are ambiguous and
/// never matched. When several dates appear the earliest in the text wins.
pub fn first_full_date(raw: &str) -> Option<NaiveDate> {
    let mut best: Option<(usize, NaiveDate)> = None;

    let mut consider = |position: usize, date: Option<NaiveDate>| {
        if let Some(date) = date {
            if best.map(|(p, _)| position < p).unwrap_or(true) {
                best = Some((position, date));
            }
        }
    };

    for caps in ISO_DATE.captures_iter(raw) {
        let date = ymd(&caps[1], &caps[2], &caps[3]);
        if date.is_some() {
            consider(caps.get(0).map(|m| m.start()).unwrap_or(0), date);
            break;
        }
    }

    for caps in MDY_DATE.captures_iter(raw) {
        let date = month_number(&caps[1]).and_then(|m| ymd(&caps[3], &m.to_string(), &caps[2]));
        if date.is_some() {
            consider(caps.get(0).map(|m| m.start()).unwrap_or(0), date);
            break;
        }
    }

    for caps in DMY_DATE.captures_iter(raw) {
        let date = month_number(&caps[2]).and_then(|m| ymd(&caps[3], &m.to_string(), &caps[1]));
        if date.is_some() {
            consider(caps.get(0).map(|m| m.start()).unwrap_or(0), date);
            break;
        }
    }

    best.map(|(_, date)| date)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "January" => 1,
        "February" => 2,
        "March" => 3,
        "April" => 4,
        "May" => 5,
        "June" => 6,
        "July" => 7,
        "August" => 8,
        "September" => 9,
        "October" => 10,
        "November" => 11,
        "December" => 12,
        _ => return None,
    };
    Some(month)
}

/// Converts a running time or broadcast length to whole minutes
///
/// Handles "142 minutes", "118 min", "2 hours 22 minutes" and "3 h".
/// The earliest duration in the text is used.
pub fn parse_duration_minutes(raw: &str) -> Option<u32> {
    let hours = HOURS_DURATION.captures(raw).and_then(|caps| {
        let start = caps.get(0)?.start();
        let h: u32 = caps[1].parse().ok()?;
        let m: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        Some((start, h.checked_mul(60)?.checked_add(m)?))
    });

    let minutes = MINUTES_DURATION.captures(raw).and_then(|caps| {
        let start = caps.get(0)?.start();
        let m: u32 = caps[1].parse().ok()?;
        Some((start, m))
    });

    match (hours, minutes) {
        (Some((hs, h)), Some((ms, m))) => Some(if hs <= ms { h } else { m }),
        (Some((_, h)), None) => Some(h),
        (None, Some((_, m))) => Some(m),
        (None, None) => None,
    }
    .filter(|minutes| *minutes > 0)
}

/// English ordinal suffix for a ceremony number ("1st", "22nd", "113th")
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Spellings, demonyms and former states mapped to one country name
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("u.s.", "United States"),
    ("u.s", "United States"),
    ("us", "United States"),
    ("u.s.a.", "United States"),
    ("usa", "United States"),
    ("america", "United States"),
    ("united states of america", "United States"),
    ("american", "United States"),
    ("u.k.", "United Kingdom"),
    ("uk", "United Kingdom"),
    ("great britain", "United Kingdom"),
    ("britain", "United Kingdom"),
    ("england", "United Kingdom"),
    ("scotland", "United Kingdom"),
    ("wales", "United Kingdom"),
    ("northern ireland", "United Kingdom"),
    ("british", "United Kingdom"),
    ("english", "United Kingdom"),
    ("scottish", "United Kingdom"),
    ("welsh", "United Kingdom"),
    ("ussr", "Russia"),
    ("soviet union", "Russia"),
    ("russian", "Russia"),
    ("republic of ireland", "Ireland"),
    ("irish", "Ireland"),
    ("federal republic of germany", "Germany"),
    ("west germany", "Germany"),
    ("east germany", "Germany"),
    ("nazi germany", "Germany"),
    ("german", "Germany"),
    ("people's republic of china", "China"),
    ("republic of china", "China"),
    ("chinese", "China"),
    ("japanese", "Japan"),
    ("french", "France"),
    ("italian", "Italy"),
    ("canadian", "Canada"),
    ("australian", "Australia"),
    ("indian", "India"),
    ("brazilian", "Brazil"),
    ("mexican", "Mexico"),
    ("spanish", "Spain"),
    ("holland", "Netherlands"),
    ("dutch", "Netherlands"),
    ("swedish", "Sweden"),
    ("norwegian", "Norway"),
    ("danish", "Denmark"),
    ("polish", "Poland"),
    ("austrian", "Austria"),
    ("swiss", "Switzerland"),
    ("belgian", "Belgium"),
    ("greek", "Greece"),
    ("turkish", "Turkey"),
    ("egyptian", "Egypt"),
    ("south african", "South Africa"),
];

/// Places that only ever stand for the United States in a birthplace
const US_PLACES: &[&str] = &[
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado",
    "connecticut", "delaware", "florida", "hawaii", "idaho", "illinois",
    "indiana", "iowa", "kansas", "kentucky", "louisiana", "maine", "maryland",
    "massachusetts", "michigan", "minnesota", "mississippi", "missouri",
    "montana", "nebraska", "nevada", "new hampshire", "new jersey",
    "new mexico", "new york", "north carolina", "north dakota", "ohio",
    "oklahoma", "oregon", "pennsylvania", "rhode island", "south carolina",
    "south dakota", "tennessee", "texas", "utah", "vermont", "virginia",
    "west virginia", "wisconsin", "wyoming", "hollywood", "los angeles",
    "new york city", "chicago", "boston", "san francisco", "washington",
    "washington d.c.",
];

/// Maps a country value to its standard English name
///
/// Qualifiers in parentheses and everything after the first comma are
/// dropped. Unknown names are returned cleaned but otherwise unchanged.
pub fn normalize_country(raw: &str) -> Option<String> {
    let cleaned = strip_parentheticals(raw);
    let first = cleaned.split(',').next().unwrap_or_default().trim();
    if !first.chars().any(char::is_alphanumeric) {
        return None;
    }

    let key = first.to_lowercase();
    if let Some((_, country)) = COUNTRY_ALIASES.iter().find(|(alias, _)| *alias == key) {
        return Some(country.to_string());
    }
    if US_PLACES.contains(&key.as_str()) {
        return Some("United States".to_string());
    }
    Some(first.to_string())
}
