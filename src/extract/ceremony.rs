//! Ceremony page parser
//!
//! Each "Nth Academy Awards" page has an infobox with the ceremony date,
//! the venue, the broadcast and the people who hosted and produced it.

use crate::extract::detail::split_list;
use crate::extract::text::{
    element_lines, element_text, first_full_date, normalize_country, parse_duration_minutes,
};
use crate::extract::{cell_items, credits, Credit, CreditRows, Infobox};
use chrono::NaiveDate;
use scraper::Html;

const CEREMONY_STAFF: CreditRows = &[
    (&["hosted by", "host"], "Host"),
    (&["pre-show", "preshow"], "Pre-show Host"),
    (&["produced by"], "Producer"),
    (&["directed by"], "Director"),
];

/// Where a ceremony took place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VenueDetails {
    pub name: String,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl VenueDetails {
    /// Splits "Name, [Neighborhood,] City, State, Country" into parts
    ///
    /// Segments after the name are assigned by count: one is a city; two a
    /// city and state; three add the country. With four or more the last
    /// four are neighborhood, city, state and country.
    pub fn from_segments(segments: &[String]) -> Option<Self> {
        let (name, rest) = segments.split_first()?;
        if name.is_empty() {
            return None;
        }

        let rest: Vec<Option<String>> = rest.iter().map(|s| Some(s.clone())).collect();
        let mut venue = Self {
            name: name.clone(),
            ..Self::default()
        };

        match rest.as_slice() {
            [] => {}
            [city] => venue.city = city.clone(),
            [city, state] => {
                venue.city = city.clone();
                venue.state = state.clone();
            }
            [city, state, country] => {
                venue.city = city.clone();
                venue.state = state.clone();
                venue.country = country.clone();
            }
            [.., neighborhood, city, state, country] => {
                venue.neighborhood = neighborhood.clone();
                venue.city = city.clone();
                venue.state = state.clone();
                venue.country = country.clone();
            }
        }
        venue.country = venue.country.as_deref().and_then(normalize_country);

        Some(venue)
    }
}

/// Attributes read from a ceremony page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CeremonyDetails {
    pub date: Option<NaiveDate>,
    pub venue: Option<VenueDetails>,
    pub duration_minutes: Option<u32>,
    pub network: Option<String>,
    pub staff: Vec<Credit>,
}

/// Parses a ceremony page infobox
pub fn parse_ceremony_page(html: &str) -> CeremonyDetails {
    let document = Html::parse_document(html);
    let infobox = Infobox::from_document(&document);

    let date = infobox
        .value(&["date"])
        .and_then(|cell| first_full_date(&element_text(cell)));

    let venue = infobox
        .value(&["site", "venue", "location"])
        .and_then(|cell| {
            let segments: Vec<String> = element_lines(cell)
                .iter()
                .flat_map(|line| line.split(','))
                .map(|segment| segment.trim().to_string())
                .filter(|segment| !segment.is_empty())
                .collect();
            VenueDetails::from_segments(&segments)
        });

    let duration_minutes = infobox
        .value(&["duration", "running time"])
        .and_then(|cell| parse_duration_minutes(&element_text(cell)));

    let network = infobox
        .value(&["network", "television", "broadcaster"])
        .and_then(|cell| cell_items(cell, split_list).into_iter().next());

    CeremonyDetails {
        date,
        venue,
        duration_minutes,
        network,
        staff: credits(&infobox, CEREMONY_STAFF),
    }
}
