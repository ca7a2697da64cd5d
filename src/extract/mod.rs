//! Page parsers
//!
//! Each parser takes the markup of one fetched page and returns plain data:
//!
//! - `category`: nomination tables on a category listing page
//! - `detail`: film and person infoboxes
//! - `ceremony`: the infobox of one ceremony page
//!
//! Parsers never touch the network or the schema; the crawler feeds them
//! markup and hands their output to the assembler.

pub mod category;
pub mod ceremony;
pub mod detail;
pub mod text;

pub use category::{parse_category_page, CategoryPage, NominationEntry, PersonRef};
pub use ceremony::{parse_ceremony_page, CeremonyDetails, VenueDetails};
pub use detail::{parse_movie_page, parse_person_page, MovieDetails, PersonDetails};
pub use text::ordinal;

use scraper::{ElementRef, Html};
use thiserror::Error;
use url::Url;

/// Why a table row did not produce a nomination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Error)]
pub enum RowError {
    #[error("row has fewer cells than the table's film column needs")]
    TooFewCells,

    #[error("no ceremony could be determined for the row")]
    NoEdition,

    #[error("row has no film title")]
    MissingTitle,
}

impl RowError {
    /// Short key used in run summaries
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TooFewCells => "too_few_cells",
            Self::NoEdition => "no_edition",
            Self::MissingTitle => "missing_title",
        }
    }
}

/// Maps between ceremony numbers and calendar years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditionCalendar {
    /// Year of the first ceremony
    pub first_year: i32,
}

impl EditionCalendar {
    pub fn new(first_year: i32) -> Self {
        Self { first_year }
    }

    /// Ceremony year of an edition, assuming one ceremony per year
    pub fn year_of(&self, edition: u32) -> i32 {
        self.first_year + edition as i32 - 1
    }

    /// Edition honouring films released in `film_year`
    ///
    /// Category tables list the eligibility year; the ceremony takes place
    /// the following year.
    pub fn edition_for_film_year(&self, film_year: i32) -> Option<u32> {
        let edition = film_year - self.first_year + 2;
        u32::try_from(edition).ok().filter(|e| *e >= 1)
    }
}

impl Default for EditionCalendar {
    fn default() -> Self {
        Self::new(1929)
    }
}

/// Owned labels paired with value cells; labels are lowercased
pub(crate) struct Infobox<'a> {
    rows: Vec<(String, ElementRef<'a>)>,
}

impl<'a> Infobox<'a> {
    /// Reads the first `table.infobox` of a page
    pub fn from_document(document: &'a Html) -> Self {
        let mut rows = Vec::new();

        if let Some(table) = document.select(&selectors::INFOBOX).next() {
            for row in table.select(&selectors::TR) {
                let label = row.select(&selectors::TH).next();
                let value = row.select(&selectors::TD).next();
                if let (Some(label), Some(value)) = (label, value) {
                    let label = text::element_text(label).to_lowercase();
                    if !label.is_empty() {
                        rows.push((label, value));
                    }
                }
            }
        }

        Self { rows }
    }

    /// Value cell of the first row whose label starts with any of `labels`
    pub fn value(&self, labels: &[&str]) -> Option<ElementRef<'a>> {
        self.rows
            .iter()
            .find(|(label, _)| labels.iter().any(|l| label.starts_with(l)))
            .map(|(_, value)| *value)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A person credited in an infobox under a job title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub name: String,
    pub position: &'static str,
}

/// Infobox labels and the job title each one credits
pub(crate) type CreditRows = &'static [(&'static [&'static str], &'static str)];

/// Items of a list-like infobox value
///
/// List items are used when present, otherwise the value is split at line
/// breaks and then with `split`.
pub(crate) fn cell_items(cell: ElementRef<'_>, split: fn(&str) -> Vec<String>) -> Vec<String> {
    let mut items: Vec<String> = cell
        .select(&selectors::LIST_ITEM)
        .map(text::element_text)
        .collect();

    if items.is_empty() {
        items = text::element_lines(cell);
    }

    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .flat_map(|item| split(item))
        .filter(|item| !item.is_empty() && seen.insert(item.to_lowercase()))
        .collect()
}

/// Credits for every configured label present in the infobox
pub(crate) fn credits(infobox: &Infobox<'_>, rows: CreditRows) -> Vec<Credit> {
    let mut credits = Vec::new();
    for (labels, position) in rows {
        if let Some(cell) = infobox.value(labels) {
            for name in cell_items(cell, text::split_names) {
                credits.push(Credit {
                    name,
                    position: *position,
                });
            }
        }
    }
    credits
}

/// A named link found inside a cell
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Anchor {
    pub text: String,
    pub url: Option<Url>,
}

/// Visible anchors of an element in document order
///
/// Anchors inside footnotes or hidden sort keys are skipped. The URL is set
/// only for links that point at an existing article on the page's site.
pub(crate) fn visible_anchors(element: ElementRef<'_>, page_url: &Url) -> Vec<Anchor> {
    element
        .select(&selectors::ANCHOR)
        .filter(|anchor| {
            !anchor
                .ancestors()
                .take_while(|node| node.id() != element.id())
                .filter_map(ElementRef::wrap)
                .any(text::is_hidden)
        })
        .filter_map(|anchor| {
            let text = text::element_text(anchor);
            if text.is_empty() {
                return None;
            }
            let href = anchor.value().attr("href")?;
            let url = crate::url::article_href(href, anchor.value().attr("class"), page_url);
            Some(Anchor { text, url })
        })
        .collect()
}

pub(crate) mod selectors {
    use once_cell::sync::Lazy;
    use scraper::Selector;

    fn parse(css: &str) -> Selector {
        Selector::parse(css).expect("hard-coded selector parses")
    }

    pub static INFOBOX: Lazy<Selector> = Lazy::new(|| parse("table.infobox"));
    pub static WIKITABLE: Lazy<Selector> = Lazy::new(|| parse("table.wikitable"));
    pub static CAPTION: Lazy<Selector> = Lazy::new(|| parse("caption"));
    pub static TR: Lazy<Selector> = Lazy::new(|| parse("tr"));
    pub static TH: Lazy<Selector> = Lazy::new(|| parse("th"));
    pub static TD: Lazy<Selector> = Lazy::new(|| parse("td"));
    pub static ANCHOR: Lazy<Selector> = Lazy::new(|| parse("a[href]"));
    pub static HEADING: Lazy<Selector> = Lazy::new(|| parse("h1"));
    pub static BDAY: Lazy<Selector> = Lazy::new(|| parse("span.bday"));
    pub static DDAY: Lazy<Selector> = Lazy::new(|| parse("span.dday"));
    pub static LIST_ITEM: Lazy<Selector> = Lazy::new(|| parse("li"));
    pub static BIRTHPLACE: Lazy<Selector> = Lazy::new(|| parse(".birthplace"));
}
