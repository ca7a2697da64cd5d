//! Film and person detail page parsers
//!
//! Both read the page's infobox and return whatever attributes are present.
//! Missing or unparseable fields are `None` or empty, never placeholders.

use crate::extract::text::{
    element_lines, element_text, first_full_date, normalize_country, parse_duration_minutes,
    strip_parentheticals,
};
use crate::extract::{cell_items, credits, selectors, Credit, CreditRows, Infobox};
use chrono::NaiveDate;
use scraper::Html;
use url::Url;

const MOVIE_CREW: CreditRows = &[
    (&["directed by"], "Director"),
    (&["produced by"], "Producer"),
    (&["written by", "screenplay by"], "Writer"),
    (&["edited by"], "Editor"),
    (&["cinematography"], "Cinematographer"),
    (&["music by"], "Composer"),
    (&["starring"], "Actor"),
];

/// Attributes read from a film page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieDetails {
    /// Page heading without disambiguation ("Cabaret (1972 film)" -> "Cabaret")
    pub title: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub languages: Vec<String>,
    pub countries: Vec<String>,
    /// One date per release entry that carries an unambiguous full date
    pub release_dates: Vec<NaiveDate>,
    pub crew: Vec<Credit>,
    pub production_companies: Vec<String>,
}

/// Attributes read from a person page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonDetails {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub country: Option<String>,
}

/// Parses a film page infobox
pub fn parse_movie_page(html: &str, page_url: &Url) -> MovieDetails {
    let document = Html::parse_document(html);
    let infobox = Infobox::from_document(&document);

    if infobox.is_empty() {
        tracing::debug!("No infobox on film page {}", page_url);
    }

    let runtime_minutes = infobox
        .value(&["running time", "runtime"])
        .and_then(|cell| parse_duration_minutes(&element_text(cell)));

    let languages = infobox
        .value(&["language"])
        .map(|cell| cell_items(cell, split_list))
        .unwrap_or_default();

    let mut countries: Vec<String> = Vec::new();
    if let Some(cell) = infobox.value(&["country", "countries"]) {
        for country in cell_items(cell, split_list).iter().filter_map(|c| normalize_country(c)) {
            if !countries.contains(&country) {
                countries.push(country);
            }
        }
    }

    let mut release_dates = Vec::new();
    if let Some(cell) = infobox.value(&["release date", "released"]) {
        for item in release_entries(cell) {
            if let Some(date) = first_full_date(&item) {
                if !release_dates.contains(&date) {
                    release_dates.push(date);
                }
            }
        }
    }

    let production_companies = infobox
        .value(&["production compan", "production", "studio"])
        .map(|cell| cell_items(cell, split_list))
        .unwrap_or_default();

    MovieDetails {
        title: page_heading(&document),
        runtime_minutes,
        languages,
        countries,
        release_dates,
        crew: credits(&infobox, MOVIE_CREW),
        production_companies,
    }
}

/// Parses a person page infobox
pub fn parse_person_page(html: &str) -> PersonDetails {
    let document = Html::parse_document(html);
    let infobox = Infobox::from_document(&document);
    let born = infobox.value(&["born"]);
    let died = infobox.value(&["died"]);

    let birth_date = microformat_date(&document, &selectors::BDAY)
        .or_else(|| born.and_then(|cell| first_full_date(&element_text(cell))));

    let death_date = microformat_date(&document, &selectors::DDAY)
        .or_else(|| died.and_then(|cell| first_full_date(&element_text(cell))));

    let country = infobox
        .value(&["nationality", "citizenship"])
        .and_then(|cell| cell_items(cell, split_list).into_iter().next())
        .or_else(|| born.and_then(birthplace_country))
        .and_then(|country| normalize_country(&country));

    PersonDetails {
        name: page_heading(&document),
        birth_date,
        death_date,
        country,
    }
}

fn page_heading(document: &Html) -> Option<String> {
    document
        .select(&selectors::HEADING)
        .next()
        .map(|h1| strip_parentheticals(&element_text(h1)))
        .filter(|heading| !heading.is_empty())
}

fn microformat_date(document: &Html, selector: &scraper::Selector) -> Option<NaiveDate> {
    document
        .select(selector)
        .next()
        .and_then(|span| first_full_date(&element_text(span)))
}

/// Release entries are list items, or lines when the cell has no list
fn release_entries(cell: scraper::ElementRef<'_>) -> Vec<String> {
    let items: Vec<String> = cell
        .select(&selectors::LIST_ITEM)
        .map(element_text)
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        element_lines(cell)
    } else {
        items
    }
}

/// Last place segment of the birthplace ("Omaha, Nebraska, U.S." -> "U.S.")
///
/// The caller normalizes the result.
fn birthplace_country(born: scraper::ElementRef<'_>) -> Option<String> {
    let place = match born.select(&selectors::BIRTHPLACE).next() {
        Some(place) => element_text(place),
        None => element_lines(born)
            .into_iter()
            .filter(|line| line.contains(',') && first_full_date(line).is_none())
            .last()?,
    };

    place
        .rsplit(',')
        .next()
        .map(strip_parentheticals)
        .filter(|country| !country.is_empty())
}

/// Splits a comma or semicolon separated value; "and" is kept
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(strip_parentheticals)
        .filter(|item| !item.is_empty())
        .collect()
}
