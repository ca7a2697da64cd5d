//! Category listing page parser
//!
//! A category page ("Academy Award for Best Picture") lists every nominee in
//! one or more `wikitable` tables. Year cells usually span all nominee rows
//! of a ceremony, winners are shaded, and person cells may name several
//! co-nominees. This module flattens that into one [`NominationEntry`] per
//! nominee row.

use crate::extract::text::{element_lines, element_text, split_names, strip_parentheticals};
use crate::extract::{selectors, visible_anchors, EditionCalendar, RowError};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

static ORDINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3})(?:st|nd|rd|th)\b").expect("hard-coded pattern compiles")
});
static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(1[89]\d{2}|20\d{2})\b").expect("hard-coded pattern compiles"));

/// Background colour the templates use for winning rows
const WINNER_COLOUR: &str = "faeb86";

/// Glyphs that mark a winner inside a cell
const WINNER_GLYPHS: &[char] = &['\u{2713}', '\u{2714}', '\u{2611}', '\u{2021}'];

/// Posthumous nomination marker
const POSTHUMOUS_GLYPH: char = '\u{2020}';

/// Tables about records rather than nominations
const RECORD_TABLE_TERMS: &[&str] = &["most wins", "most nominations", "superlative"];

const YEAR_TERMS: &[&str] = &["year", "ceremony", "edition"];
const COUNTRY_TERMS: &[&str] = &["country", "submitting"];
const IGNORED_TERMS: &[&str] = &["role", "character", "song", "language", "note", "ref"];
const FILM_TERMS: &[&str] = &["film", "movie", "picture", "work", "title"];
const PERSON_TERMS: &[&str] = &[
    "nominee",
    "actor",
    "actress",
    "director",
    "producer",
    "recipient",
    "writer",
    "composer",
    "lyricist",
    "cinematographer",
    "editor",
    "designer",
    "person",
    "name",
    "winner",
];

/// A person named in a nomination row
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRef {
    pub name: String,
    /// Detail page, when the name links to an existing article
    pub url: Option<Url>,
}

/// One nominee row of a category table
#[derive(Debug, Clone, PartialEq)]
pub struct NominationEntry {
    /// Ceremony number
    pub edition: u32,
    /// Ceremony year
    pub year: i32,
    /// Display title of the nominated film; never empty
    pub film_title: String,
    pub film_url: Option<Url>,
    /// Co-nominees in row order
    pub people: Vec<PersonRef>,
    pub won: bool,
    /// Submitting country, for tables that list one
    pub submitted_by: Option<String>,
}

/// Everything read from one category page
#[derive(Debug, Clone, Default)]
pub struct CategoryPage {
    pub entries: Vec<NominationEntry>,
    /// Reason for every data row that did not produce an entry
    pub skipped: Vec<RowError>,
    /// Number of nomination tables read
    pub tables_read: usize,
}

impl CategoryPage {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses the nomination tables of a category page
///
/// # Arguments
///
/// * `html` - Raw page markup
/// * `page_url` - URL the page was fetched from, for resolving links
/// * `calendar` - Maps years in the tables to ceremony numbers
///
/// # Returns
///
/// Entries in document order plus the reason for every skipped row. A page
/// without usable tables yields an empty result rather than an error.
pub fn parse_category_page(html: &str, page_url: &Url, calendar: &EditionCalendar) -> CategoryPage {
    let document = Html::parse_document(html);
    let mut page = CategoryPage::default();

    for table in document.select(&selectors::WIKITABLE) {
        parse_table(table, page_url, calendar, &mut page);
    }

    page
}

#[derive(Debug, Clone, Copy)]
struct GridCell<'a> {
    element: ElementRef<'a>,
    header: bool,
    /// Copied down from a rowspan or across from a colspan
    carried: bool,
}

struct GridRow<'a> {
    row: ElementRef<'a>,
    cells: Vec<GridCell<'a>>,
}

impl GridRow<'_> {
    /// Rows made only of `th` cells are headers or section labels
    fn is_header(&self) -> bool {
        self.cells.iter().all(|cell| cell.header)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    year: Option<usize>,
    film: usize,
    person: Option<usize>,
    country: Option<usize>,
}

fn parse_table(
    table: ElementRef<'_>,
    page_url: &Url,
    calendar: &EditionCalendar,
    page: &mut CategoryPage,
) {
    let rows = expand_rows(table);
    let first_data = rows.iter().position(|row| !row.is_header());
    let header = rows
        .iter()
        .position(|row| row.is_header() && !row.cells.is_empty())
        .filter(|h| first_data.map(|d| *h < d).unwrap_or(false));

    let data_rows = rows.iter().filter(|row| !row.is_header()).count();
    if data_rows < 2 {
        return;
    }

    let caption = table
        .select(&selectors::CAPTION)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let header_text = header
        .map(|h| element_text(rows[h].row))
        .unwrap_or_default();
    let context_text = format!("{} {}", caption, header_text).to_lowercase();
    if RECORD_TABLE_TERMS.iter().any(|t| context_text.contains(t)) {
        tracing::debug!("Skipping records table: {}", caption);
        return;
    }

    let width = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    let columns = classify_columns(header.map(|h| &rows[h]), width);
    page.tables_read += 1;

    let mut context = edition_marker(&caption, calendar).or_else(|| heading_context(table, calendar));
    let mut entries = Vec::new();
    let mut marked = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if Some(index) == header {
            continue;
        }

        if row.is_header() {
            if let Some(edition) = edition_marker(&element_text(row.row), calendar) {
                context = Some(edition);
            }
            continue;
        }

        let year_cell = match columns.year {
            Some(year) => row.cells.get(year),
            None => row.cells.first().filter(|cell| cell.header),
        };
        if let Some(edition) = year_cell.and_then(|cell| edition_marker(&element_text(cell.element), calendar)) {
            context = Some(edition);
        }

        match build_entry(row, columns, context, page_url, calendar) {
            Ok(entry) => {
                marked.push(row_is_marked(row, columns));
                entries.push(entry);
            }
            Err(reason) => {
                tracing::debug!("Skipping row on {}: {}", page_url, reason);
                page.skipped.push(reason);
            }
        }
    }

    if marked.iter().any(|m| *m) {
        for (entry, is_marked) in entries.iter_mut().zip(marked) {
            entry.won = is_marked;
        }
    } else {
        // Unmarked tables list the winner first in each ceremony group
        let mut seen = HashSet::new();
        for entry in entries.iter_mut() {
            entry.won = seen.insert(entry.edition);
        }
    }

    page.entries.extend(entries);
}

fn build_entry(
    row: &GridRow<'_>,
    columns: Columns,
    context: Option<u32>,
    page_url: &Url,
    calendar: &EditionCalendar,
) -> Result<NominationEntry, RowError> {
    let film_cell = row.cells.get(columns.film).ok_or(RowError::TooFewCells)?;
    let edition = context.ok_or(RowError::NoEdition)?;

    let (film_title, film_url) = film_of(film_cell.element, page_url);
    if !film_title.chars().any(char::is_alphanumeric) {
        return Err(RowError::MissingTitle);
    }

    let people = columns
        .person
        .and_then(|p| row.cells.get(p))
        .map(|cell| people_of(cell.element, page_url))
        .unwrap_or_default();

    let submitted_by = columns
        .country
        .and_then(|c| row.cells.get(c))
        .map(|cell| strip_parentheticals(&element_text(cell.element)))
        .filter(|country| !country.is_empty());

    Ok(NominationEntry {
        edition,
        year: calendar.year_of(edition),
        film_title,
        film_url,
        people,
        won: false,
        submitted_by,
    })
}

/// Expands rowspan and colspan into a rectangular grid
fn expand_rows(table: ElementRef<'_>) -> Vec<GridRow<'_>> {
    let mut pending: Vec<Option<(GridCell<'_>, usize)>> = Vec::new();
    let mut rows = Vec::new();

    for tr in table.select(&selectors::TR) {
        if !in_table(tr, table) {
            continue;
        }

        let mut cells = Vec::new();
        let mut col = 0;

        let own_cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| matches!(cell.value().name(), "td" | "th"));

        for cell in own_cells {
            take_pending(&mut pending, &mut cells, &mut col);

            let header = cell.value().name() == "th";
            let rowspan = span(cell, "rowspan");
            let colspan = span(cell, "colspan");

            for offset in 0..colspan {
                let grid_cell = GridCell {
                    element: cell,
                    header,
                    carried: offset > 0,
                };
                cells.push(grid_cell);

                if rowspan > 1 {
                    if pending.len() <= col {
                        pending.resize(col + 1, None);
                    }
                    pending[col] = Some((
                        GridCell {
                            carried: true,
                            ..grid_cell
                        },
                        rowspan - 1,
                    ));
                }
                col += 1;
            }
        }
        take_pending(&mut pending, &mut cells, &mut col);

        rows.push(GridRow { row: tr, cells });
    }

    rows
}

/// Copies spanned cells into the current row while the next column is covered
fn take_pending<'a>(
    pending: &mut [Option<(GridCell<'a>, usize)>],
    cells: &mut Vec<GridCell<'a>>,
    col: &mut usize,
) {
    while let Some(slot) = pending.get_mut(*col) {
        let Some((cell, remaining)) = slot.as_mut() else {
            break;
        };
        cells.push(*cell);
        *remaining -= 1;
        if *remaining == 0 {
            *slot = None;
        }
        *col += 1;
    }
}

fn span(cell: ElementRef<'_>, attribute: &str) -> usize {
    cell.value()
        .attr(attribute)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, 500)
}

/// Rows of nested tables belong to the nested table only
fn in_table(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
        .map(|nearest| nearest.id() == table.id())
        .unwrap_or(false)
}

fn classify_columns(header: Option<&GridRow<'_>>, width: usize) -> Columns {
    let mut year = None;
    let mut film = None;
    let mut person = None;
    let mut country = None;

    if let Some(header) = header {
        for (index, cell) in header.cells.iter().enumerate() {
            let label = element_text(cell.element).to_lowercase();
            if label.is_empty() {
                continue;
            }

            let slot = if contains_any(&label, YEAR_TERMS) {
                &mut year
            } else if contains_any(&label, COUNTRY_TERMS) {
                &mut country
            } else if contains_any(&label, IGNORED_TERMS) {
                continue;
            } else if contains_any(&label, FILM_TERMS) {
                &mut film
            } else if contains_any(&label, PERSON_TERMS) {
                &mut person
            } else {
                continue;
            };

            if slot.is_none() {
                *slot = Some(index);
            }
        }
    }

    let film = film.unwrap_or_else(|| {
        (0..width.max(1))
            .find(|c| Some(*c) != year && Some(*c) != person && Some(*c) != country)
            .unwrap_or(0)
    });

    Columns {
        year,
        film,
        person,
        country,
    }
}

fn contains_any(label: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| label.contains(term))
}

/// Reads a ceremony number from a year cell, caption or heading
///
/// An ordinal ("45th") is the ceremony itself. A bare year is the film
/// eligibility year.
fn edition_marker(text: &str, calendar: &EditionCalendar) -> Option<u32> {
    if let Some(caps) = ORDINAL.captures(text) {
        return caps[1].parse::<u32>().ok().filter(|n| *n >= 1);
    }

    YEAR.captures(text)
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .and_then(|year| calendar.edition_for_film_year(year))
}

/// Edition named by the section heading right before a table
fn heading_context(table: ElementRef<'_>, calendar: &EditionCalendar) -> Option<u32> {
    for sibling in table.prev_siblings().filter_map(ElementRef::wrap) {
        let name = sibling.value().name();
        if name == "table" {
            return None;
        }
        let is_heading = matches!(name, "h2" | "h3" | "h4")
            || sibling.value().classes().any(|c| c == "mw-heading");
        if is_heading {
            return edition_marker(&element_text(sibling), calendar);
        }
    }
    None
}

fn has_winner_colour(element: ElementRef<'_>) -> bool {
    let value = element.value();
    [value.attr("style"), value.attr("bgcolor")]
        .into_iter()
        .flatten()
        .any(|attr| attr.to_lowercase().contains(WINNER_COLOUR))
}

fn has_winner_class(element: ElementRef<'_>) -> bool {
    element
        .value()
        .classes()
        .any(|c| c.eq_ignore_ascii_case("yes") || c.eq_ignore_ascii_case("winner"))
}

/// Explicit winner markers on a row or its own cells
fn row_is_marked(row: &GridRow<'_>, columns: Columns) -> bool {
    if has_winner_colour(row.row) || has_winner_class(row.row) {
        return true;
    }

    row.cells
        .iter()
        .enumerate()
        .filter(|(index, cell)| !cell.carried && Some(*index) != columns.year)
        .any(|(_, cell)| {
            if has_winner_colour(cell.element) || has_winner_class(cell.element) {
                return true;
            }
            let text = element_text(cell.element).to_lowercase();
            matches!(text.as_str(), "yes" | "won" | "winner")
                || text.chars().any(|c| WINNER_GLYPHS.contains(&c))
        })
}

/// Text with winner and posthumous glyphs removed
fn without_marks(text: &str) -> String {
    text.chars()
        .filter(|c| !WINNER_GLYPHS.contains(c) && *c != POSTHUMOUS_GLYPH)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn film_of(cell: ElementRef<'_>, page_url: &Url) -> (String, Option<Url>) {
    match visible_anchors(cell, page_url).into_iter().next() {
        Some(anchor) => (without_marks(&anchor.text), anchor.url),
        None => (without_marks(&strip_parentheticals(&element_text(cell))), None),
    }
}

fn people_of(cell: ElementRef<'_>, page_url: &Url) -> Vec<PersonRef> {
    let anchors = visible_anchors(cell, page_url);

    if !anchors.is_empty() {
        return anchors
            .into_iter()
            .map(|anchor| PersonRef {
                name: without_marks(&strip_parentheticals(&anchor.text)),
                url: anchor.url,
            })
            .filter(|person| !person.name.is_empty())
            .collect();
    }

    element_lines(cell)
        .iter()
        .flat_map(|line| split_names(&without_marks(line)))
        .map(|name| PersonRef { name, url: None })
        .collect()
}
