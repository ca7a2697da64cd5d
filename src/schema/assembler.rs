//! Accumulates entities and relations into output tables
//!
//! The assembler owns the resolver and one row set per table. Parsers'
//! output is fed in through the entity, relation and enrichment methods;
//! `snapshot` turns the current state into a set of tables whose foreign
//! keys all resolve.

use crate::extract::text::{clean_text, split_person_name, strip_parentheticals};
use crate::extract::{CeremonyDetails, EditionCalendar, MovieDetails, PersonDetails, VenueDetails};
use crate::schema::resolver::{normalize_key, EntityKind, Resolver};
use crate::schema::tables::*;
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Job titles registered up front so their ids are the same in every run
pub const DEFAULT_POSITIONS: [&str; 19] = [
    "Director",
    "Actor",
    "Actress",
    "Supporting Actor",
    "Supporting Actress",
    "Producer",
    "Writer",
    "Editor",
    "Cinematographer",
    "Composer",
    "Singer",
    "Art Director",
    "Visual Effects Artist",
    "Makeup Artist",
    "Hairstylist",
    "Sound Designer",
    "Animator",
    "Host",
    "Pre-show Host",
];

/// Cell contents that stand in for a missing person
const PLACEHOLDER_NAMES: &[&str] = &[
    "n/a",
    "na",
    "none",
    "tba",
    "tbd",
    "unknown",
    "uncredited",
    "various",
    "various artists",
    "others",
    "et al.",
];

/// A row whose foreign key has no emitted parent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{table} row references {parent} id {id}, which is not emitted")]
pub struct IntegrityViolation {
    pub table: &'static str,
    pub parent: &'static str,
    pub id: Id,
}

/// Rows dropped while checking foreign keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Dropped row count per table
    pub fn by_table(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for violation in &self.violations {
            *counts.entry(violation.table).or_insert(0) += 1;
        }
        counts
    }
}

/// Insertion-ordered set of relation rows
#[derive(Debug)]
struct JoinRows<T> {
    rows: Vec<T>,
    seen: HashSet<T>,
}

impl<T> Default for JoinRows<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> JoinRows<T> {
    fn insert(&mut self, row: T) -> bool {
        if self.seen.insert(row.clone()) {
            self.rows.push(row);
            true
        } else {
            false
        }
    }

    fn to_vec(&self) -> Vec<T> {
        self.rows.clone()
    }
}

fn row_mut<R>(rows: &mut [R], id: Id) -> Option<&mut R> {
    rows.get_mut((id as usize).checked_sub(1)?)
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Trimmed display text with footnotes and whitespace runs removed
fn display_text(raw: &str) -> Option<String> {
    let text = clean_text(raw);
    if text.chars().any(char::is_alphanumeric) {
        Some(text)
    } else {
        None
    }
}

/// Person name with qualifiers removed, or `None` for placeholders
fn person_name(raw: &str) -> Option<String> {
    let name = display_text(&strip_parentheticals(raw))?;
    if PLACEHOLDER_NAMES.contains(&normalize_key(&name).as_str()) {
        return None;
    }
    Some(name)
}

/// All rows gathered during a run
#[derive(Debug)]
pub struct Assembler {
    resolver: Resolver,
    calendar: EditionCalendar,
    venues: Vec<VenueRow>,
    positions: Vec<PositionRow>,
    persons: Vec<PersonRow>,
    editions: Vec<AwardEditionRow>,
    categories: Vec<CategoryRow>,
    movies: Vec<MovieRow>,
    companies: Vec<ProductionCompanyRow>,
    edition_people: JoinRows<AwardEditionPersonRow>,
    movie_languages: JoinRows<MovieLanguageRow>,
    release_dates: JoinRows<MovieReleaseDateRow>,
    movie_countries: JoinRows<MovieCountryRow>,
    produced_by: JoinRows<MovieProducedByRow>,
    crew: JoinRows<MovieCrewRow>,
    nominations: Vec<NominationRow>,
    nomination_index: HashMap<(Id, Id, Id), usize>,
    nomination_people: JoinRows<NominationPersonRow>,

    /// Person names turned away as placeholders
    rejected_names: usize,
}

impl Assembler {
    /// Creates an assembler with the standard positions and editions
    /// `1..=edition_count` registered, so edition N has id N.
    pub fn new(calendar: EditionCalendar, edition_count: u32) -> Self {
        let mut assembler = Self {
            resolver: Resolver::new(),
            calendar,
            venues: Vec::new(),
            positions: Vec::new(),
            persons: Vec::new(),
            editions: Vec::new(),
            categories: Vec::new(),
            movies: Vec::new(),
            companies: Vec::new(),
            edition_people: JoinRows::default(),
            movie_languages: JoinRows::default(),
            release_dates: JoinRows::default(),
            movie_countries: JoinRows::default(),
            produced_by: JoinRows::default(),
            crew: JoinRows::default(),
            nominations: Vec::new(),
            nomination_index: HashMap::new(),
            nomination_people: JoinRows::default(),
            rejected_names: 0,
        };

        for title in DEFAULT_POSITIONS {
            assembler.position(title);
        }
        for number in 1..=edition_count {
            assembler.edition(number);
        }

        assembler
    }

    // ===== Entities =====

    /// Position id for a job title
    pub fn position(&mut self, title: &str) -> Option<Id> {
        let title = display_text(title)?;
        let (id, new) = self.resolver.resolve_new(&title, EntityKind::Position);
        if new {
            self.positions.push(PositionRow {
                position_id: id,
                title,
            });
        }
        Some(id)
    }

    /// Category id for a category name
    pub fn category(&mut self, name: &str) -> Option<Id> {
        let name = display_text(name)?;
        let (id, new) = self.resolver.resolve_new(&name, EntityKind::Category);
        if new {
            self.categories.push(CategoryRow {
                category_id: id,
                category_name: name,
            });
        }
        Some(id)
    }

    /// Edition id for a ceremony number
    pub fn edition(&mut self, number: u32) -> Id {
        let (id, new) = self
            .resolver
            .resolve_new(&number.to_string(), EntityKind::Edition);
        if new {
            self.editions.push(AwardEditionRow {
                award_edition_id: id,
                edition: number,
                year: self.calendar.year_of(number),
                ceremony_date: None,
                venue_id: None,
                duration: None,
                network: None,
            });
        }
        id
    }

    /// Movie id for a title; empty titles are rejected
    pub fn movie(&mut self, title: &str) -> Option<Id> {
        let title = display_text(title)?;
        let (id, new) = self.resolver.resolve_new(&title, EntityKind::Movie);
        if new {
            self.movies.push(MovieRow {
                movie_id: id,
                movie_name: title,
                run_time: None,
            });
        }
        Some(id)
    }

    /// Person id for a full name; placeholders such as "TBA" are rejected
    pub fn person(&mut self, full_name: &str) -> Option<Id> {
        let Some(name) = person_name(full_name) else {
            tracing::debug!("Rejected person name {:?}", full_name);
            self.rejected_names += 1;
            return None;
        };
        let (id, new) = self.resolver.resolve_new(&name, EntityKind::Person);
        if new {
            let (first_name, middle_name, last_name) = split_person_name(&name);
            self.persons.push(PersonRow {
                person_id: id,
                first_name,
                middle_name,
                last_name,
                birth_date: None,
                country: None,
                death_date: None,
            });
        }
        Some(id)
    }

    /// Venue id by name; a repeat fills location parts that were missing
    pub fn venue(&mut self, venue: &VenueDetails) -> Option<Id> {
        let name = display_text(&venue.name)?;
        let (id, new) = self.resolver.resolve_new(&name, EntityKind::Venue);
        if new {
            self.venues.push(VenueRow {
                venue_id: id,
                venue_name: name,
                neighborhood: venue.neighborhood.clone(),
                city: venue.city.clone(),
                state: venue.state.clone(),
                country: venue.country.clone(),
            });
        } else if let Some(row) = row_mut(&mut self.venues, id) {
            fill(&mut row.neighborhood, venue.neighborhood.clone());
            fill(&mut row.city, venue.city.clone());
            fill(&mut row.state, venue.state.clone());
            fill(&mut row.country, venue.country.clone());
        }
        Some(id)
    }

    /// Production company id by name
    pub fn company(&mut self, name: &str) -> Option<Id> {
        let name = display_text(name)?;
        let (id, new) = self
            .resolver
            .resolve_new(&name, EntityKind::ProductionCompany);
        if new {
            self.companies.push(ProductionCompanyRow {
                pd_id: id,
                company_name: name,
            });
        }
        Some(id)
    }

    // ===== Relations =====

    /// Records a nomination, returning its id
    ///
    /// A repeat of the same (edition, category, movie) returns the existing
    /// id; `won` is upgraded if the repeat is marked as the winner and a
    /// missing submitting country is filled in.
    pub fn nominate(
        &mut self,
        edition_id: Id,
        category_id: Id,
        movie_id: Id,
        won: bool,
        submitted_by: Option<&str>,
    ) -> Id {
        let key = (edition_id, category_id, movie_id);
        let submitted_by = submitted_by.and_then(display_text);

        if let Some(&index) = self.nomination_index.get(&key) {
            let row = &mut self.nominations[index];
            row.won |= won;
            fill(&mut row.submitted_by, submitted_by);
            return row.nomination_id;
        }

        let nomination_id = self.nominations.len() as Id + 1;
        self.nomination_index.insert(key, self.nominations.len());
        self.nominations.push(NominationRow {
            nomination_id,
            award_edition_id: edition_id,
            movie_id,
            category_id,
            won,
            submitted_by,
        });
        nomination_id
    }

    pub fn credit_nominee(&mut self, nomination_id: Id, person_id: Id) -> bool {
        self.nomination_people.insert(NominationPersonRow {
            nomination_id,
            person_id,
        })
    }

    pub fn credit_crew(&mut self, movie_id: Id, person_id: Id, position_id: Id) -> bool {
        self.crew.insert(MovieCrewRow {
            movie_id,
            person_id,
            position_id,
        })
    }

    pub fn credit_edition(&mut self, edition_id: Id, person_id: Id, position_id: Id) -> bool {
        self.edition_people.insert(AwardEditionPersonRow {
            award_edition_id: edition_id,
            person_id,
            position_id,
        })
    }

    // ===== Enrichment =====

    /// Merges film page attributes into an existing movie
    pub fn enrich_movie(&mut self, movie_id: Id, details: &MovieDetails) {
        if let Some(title) = details.title.as_deref().and_then(display_text) {
            self.resolver.alias(&title, EntityKind::Movie, movie_id);
        }
        let Some(row) = row_mut(&mut self.movies, movie_id) else {
            tracing::warn!("Cannot enrich unknown movie id {}", movie_id);
            return;
        };
        fill(&mut row.run_time, details.runtime_minutes);

        for language in details.languages.iter().filter_map(|l| display_text(l)) {
            self.movie_languages.insert(MovieLanguageRow {
                movie_id,
                in_language: language,
            });
        }

        for country in details.countries.iter().filter_map(|c| display_text(c)) {
            self.movie_countries.insert(MovieCountryRow { movie_id, country });
        }

        for release_date in &details.release_dates {
            self.release_dates.insert(MovieReleaseDateRow {
                movie_id,
                release_date: *release_date,
            });
        }

        for name in &details.production_companies {
            if let Some(production_company_id) = self.company(name) {
                self.produced_by.insert(MovieProducedByRow {
                    movie_id,
                    production_company_id,
                });
            }
        }

        for credit in &details.crew {
            let person = self.person(&credit.name);
            let position = self.position(credit.position);
            if let (Some(person_id), Some(position_id)) = (person, position) {
                self.credit_crew(movie_id, person_id, position_id);
            }
        }
    }

    /// Fills a person's missing dates and country
    pub fn enrich_person(&mut self, person_id: Id, details: &PersonDetails) {
        if let Some(name) = details.name.as_deref().and_then(person_name) {
            self.resolver.alias(&name, EntityKind::Person, person_id);
        }
        let Some(row) = row_mut(&mut self.persons, person_id) else {
            tracing::warn!("Cannot enrich unknown person id {}", person_id);
            return;
        };
        fill(&mut row.birth_date, details.birth_date);
        fill(&mut row.death_date, details.death_date);
        fill(&mut row.country, details.country.as_deref().and_then(display_text));
    }

    /// Merges ceremony page attributes into an edition
    ///
    /// The ceremony date also replaces the computed year, since the calendar
    /// only approximates it.
    pub fn enrich_edition(&mut self, edition_id: Id, details: &CeremonyDetails) {
        let venue_id = details.venue.as_ref().and_then(|venue| self.venue(venue));

        let Some(row) = row_mut(&mut self.editions, edition_id) else {
            tracing::warn!("Cannot enrich unknown edition id {}", edition_id);
            return;
        };
        if row.ceremony_date.is_none() {
            if let Some(date) = details.date {
                row.ceremony_date = Some(date);
                row.year = date.year();
            }
        }
        fill(&mut row.venue_id, venue_id);
        fill(&mut row.duration, details.duration_minutes);
        fill(&mut row.network, details.network.as_deref().and_then(display_text));

        for credit in &details.staff {
            let person = self.person(&credit.name);
            let position = self.position(credit.position);
            if let (Some(person_id), Some(position_id)) = (person, position) {
                self.credit_edition(edition_id, person_id, position_id);
            }
        }
    }

    // ===== Output =====

    pub fn nomination_count(&self) -> usize {
        self.nominations.len()
    }

    /// Person names rejected so far, counting every occurrence
    pub fn rejected_names(&self) -> usize {
        self.rejected_names
    }

    /// Current tables with dangling rows removed
    ///
    /// Does not consume or modify the accumulated state.
    pub fn snapshot(&self) -> (Tables, IntegrityReport) {
        check_integrity(Tables {
            venues: self.venues.clone(),
            positions: self.positions.clone(),
            persons: self.persons.clone(),
            award_editions: self.editions.clone(),
            award_edition_person: self.edition_people.to_vec(),
            categories: self.categories.clone(),
            movies: self.movies.clone(),
            movie_language: self.movie_languages.to_vec(),
            movie_release_date: self.release_dates.to_vec(),
            movie_country: self.movie_countries.to_vec(),
            production_company: self.companies.clone(),
            movie_produced_by: self.produced_by.to_vec(),
            movie_crew: self.crew.to_vec(),
            nominations: self.nominations.clone(),
            nomination_person: self.nomination_people.to_vec(),
        })
    }
}

type Parent<'a> = (&'static str, Id, &'a HashSet<Id>);

fn first_missing(parents: &[Parent<'_>]) -> Option<(&'static str, Id)> {
    parents
        .iter()
        .find(|(_, id, emitted)| !emitted.contains(id))
        .map(|(parent, id, _)| (*parent, *id))
}

fn retain_linked<R: TableRow + fmt::Debug>(
    rows: &mut Vec<R>,
    report: &mut IntegrityReport,
    dangling: impl Fn(&R) -> Option<(&'static str, Id)>,
) {
    rows.retain(|row| match dangling(row) {
        Some((parent, id)) => {
            tracing::warn!(
                "Dropping {} row {:?}: {} id {} is not emitted",
                R::NAME,
                row,
                parent,
                id
            );
            report.violations.push(IntegrityViolation {
                table: R::NAME,
                parent,
                id,
            });
            false
        }
        None => true,
    });
}

/// Drops rows whose foreign keys do not resolve
///
/// Tables are checked in load order against the parents that survived, so
/// a dropped row also removes the rows that reference it.
pub fn check_integrity(mut tables: Tables) -> (Tables, IntegrityReport) {
    let mut report = IntegrityReport::default();

    let venues: HashSet<Id> = tables.venues.iter().map(|r| r.venue_id).collect();
    let positions: HashSet<Id> = tables.positions.iter().map(|r| r.position_id).collect();
    let persons: HashSet<Id> = tables.persons.iter().map(|r| r.person_id).collect();

    retain_linked(&mut tables.award_editions, &mut report, |row| {
        row.venue_id
            .and_then(|id| first_missing(&[(VenueRow::NAME, id, &venues)]))
    });
    let editions: HashSet<Id> = tables
        .award_editions
        .iter()
        .map(|r| r.award_edition_id)
        .collect();

    retain_linked(&mut tables.award_edition_person, &mut report, |row| {
        first_missing(&[
            (AwardEditionRow::NAME, row.award_edition_id, &editions),
            (PersonRow::NAME, row.person_id, &persons),
            (PositionRow::NAME, row.position_id, &positions),
        ])
    });

    let categories: HashSet<Id> = tables.categories.iter().map(|r| r.category_id).collect();
    let movies: HashSet<Id> = tables.movies.iter().map(|r| r.movie_id).collect();

    retain_linked(&mut tables.movie_language, &mut report, |row| {
        first_missing(&[(MovieRow::NAME, row.movie_id, &movies)])
    });
    retain_linked(&mut tables.movie_release_date, &mut report, |row| {
        first_missing(&[(MovieRow::NAME, row.movie_id, &movies)])
    });
    retain_linked(&mut tables.movie_country, &mut report, |row| {
        first_missing(&[(MovieRow::NAME, row.movie_id, &movies)])
    });

    let companies: HashSet<Id> = tables.production_company.iter().map(|r| r.pd_id).collect();
    retain_linked(&mut tables.movie_produced_by, &mut report, |row| {
        first_missing(&[
            (MovieRow::NAME, row.movie_id, &movies),
            (ProductionCompanyRow::NAME, row.production_company_id, &companies),
        ])
    });
    retain_linked(&mut tables.movie_crew, &mut report, |row| {
        first_missing(&[
            (MovieRow::NAME, row.movie_id, &movies),
            (PersonRow::NAME, row.person_id, &persons),
            (PositionRow::NAME, row.position_id, &positions),
        ])
    });

    retain_linked(&mut tables.nominations, &mut report, |row| {
        first_missing(&[
            (AwardEditionRow::NAME, row.award_edition_id, &editions),
            (MovieRow::NAME, row.movie_id, &movies),
            (CategoryRow::NAME, row.category_id, &categories),
        ])
    });
    let nominations: HashSet<Id> = tables.nominations.iter().map(|r| r.nomination_id).collect();

    retain_linked(&mut tables.nomination_person, &mut report, |row| {
        first_missing(&[
            (NominationRow::NAME, row.nomination_id, &nominations),
            (PersonRow::NAME, row.person_id, &persons),
        ])
    });

    (tables, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Credit;
    use chrono::NaiveDate;

    fn assembler() -> Assembler {
        Assembler::new(EditionCalendar::new(1929), 96)
    }

    #[test]
    fn test_seeded_ids() {
        let mut assembler = assembler();
        assert_eq!(assembler.position("Director"), Some(1));
        assert_eq!(assembler.position("pre-show host"), Some(19));
        assert_eq!(assembler.edition(45), 45);
        assert_eq!(assembler.edition(96), 96);

        let (tables, report) = assembler.snapshot();
        assert!(report.is_clean());
        assert_eq!(tables.positions.len(), 19);
        assert_eq!(tables.award_editions.len(), 96);
        assert_eq!(tables.award_editions[44].year, 1973);
    }

    #[test]
    fn test_person_name_split_and_placeholders() {
        let mut assembler = assembler();
        let id = assembler.person("Francis Ford Coppola").unwrap();
        assert_eq!(assembler.person("francis  ford coppola"), Some(id));
        assert_eq!(assembler.person("TBA"), None);
        assert_eq!(assembler.person(" — "), None);
        assert_eq!(assembler.rejected_names(), 2);

        let (tables, _) = assembler.snapshot();
        let row = &tables.persons[0];
        assert_eq!(row.first_name, "Francis");
        assert_eq!(row.middle_name.as_deref(), Some("Ford"));
        assert_eq!(row.last_name.as_deref(), Some("Coppola"));
    }

    #[test]
    fn test_nomination_dedup_upgrades_won() {
        let mut assembler = assembler();
        let category = assembler.category("Best Picture").unwrap();
        let movie = assembler.movie("The Godfather").unwrap();
        let edition = assembler.edition(45);

        let first = assembler.nominate(edition, category, movie, false, None);
        let second = assembler.nominate(edition, category, movie, true, None);
        let third = assembler.nominate(edition, category, movie, false, None);

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(assembler.nomination_count(), 1);
        let (tables, _) = assembler.snapshot();
        assert!(tables.nominations[0].won);
    }

    #[test]
    fn test_enrich_movie_fills_only_empty() {
        let mut assembler = assembler();
        let movie = assembler.movie("Cabaret").unwrap();
        let details = MovieDetails {
            runtime_minutes: Some(124),
            languages: vec!["English".to_string(), "German".to_string()],
            countries: vec!["United States".to_string()],
            release_dates: vec![NaiveDate::from_ymd_opt(1972, 2, 13).unwrap()],
            crew: vec![Credit {
                name: "Bob Fosse".to_string(),
                position: "Director",
            }],
            production_companies: vec!["ABC Pictures".to_string()],
            ..MovieDetails::default()
        };
        assembler.enrich_movie(movie, &details);
        assembler.enrich_movie(
            movie,
            &MovieDetails {
                runtime_minutes: Some(999),
                ..details.clone()
            },
        );

        let (tables, report) = assembler.snapshot();
        assert!(report.is_clean());
        assert_eq!(tables.movies[0].run_time, Some(124));
        assert_eq!(tables.movie_language.len(), 2);
        assert_eq!(tables.movie_release_date.len(), 1);
        assert_eq!(tables.movie_produced_by.len(), 1);
        assert_eq!(
            tables.movie_crew,
            vec![MovieCrewRow {
                movie_id: movie,
                person_id: 1,
                position_id: 1,
            }]
        );
    }

    #[test]
    fn test_enrich_edition_sets_year_from_date() {
        let mut assembler = assembler();
        let edition = assembler.edition(1);
        let details = CeremonyDetails {
            date: NaiveDate::from_ymd_opt(1929, 5, 16),
            venue: Some(VenueDetails {
                name: "Hollywood Roosevelt Hotel".to_string(),
                city: Some("Los Angeles".to_string()),
                ..VenueDetails::default()
            }),
            duration_minutes: Some(15),
            network: None,
            staff: vec![Credit {
                name: "Douglas Fairbanks".to_string(),
                position: "Host",
            }],
        };
        assembler.enrich_edition(edition, &details);

        let (tables, report) = assembler.snapshot();
        assert!(report.is_clean());
        let row = &tables.award_editions[0];
        assert_eq!(row.ceremony_date, NaiveDate::from_ymd_opt(1929, 5, 16));
        assert_eq!(row.year, 1929);
        assert_eq!(row.venue_id, Some(1));
        assert_eq!(row.duration, Some(15));
        assert_eq!(tables.venues[0].city.as_deref(), Some("Los Angeles"));
        assert_eq!(
            tables.award_edition_person,
            vec![AwardEditionPersonRow {
                award_edition_id: edition,
                person_id: 1,
                position_id: 18,
            }]
        );
    }

    #[test]
    fn test_enrich_person_keeps_existing() {
        let mut assembler = assembler();
        let person = assembler.person("Liza Minnelli").unwrap();
        assembler.enrich_person(
            person,
            &PersonDetails {
                birth_date: NaiveDate::from_ymd_opt(1946, 3, 12),
                country: Some("U.S.".to_string()),
                ..PersonDetails::default()
            },
        );
        assembler.enrich_person(
            person,
            &PersonDetails {
                birth_date: NaiveDate::from_ymd_opt(2000, 1, 1),
                ..PersonDetails::default()
            },
        );

        let (tables, _) = assembler.snapshot();
        assert_eq!(tables.persons[0].birth_date, NaiveDate::from_ymd_opt(1946, 3, 12));
        assert_eq!(tables.persons[0].country.as_deref(), Some("U.S."));
    }

    #[test]
    fn test_page_heading_becomes_alias() {
        let mut assembler = assembler();
        let coppola = assembler.person("Francis Coppola").unwrap();
        assembler.enrich_person(
            coppola,
            &PersonDetails {
                name: Some("Francis Ford Coppola".to_string()),
                ..PersonDetails::default()
            },
        );
        let movie = assembler.movie("The Godfather Part II").unwrap();
        assembler.enrich_movie(
            movie,
            &MovieDetails {
                title: Some("The Godfather: Part II".to_string()),
                ..MovieDetails::default()
            },
        );

        assert_eq!(assembler.person("Francis Ford Coppola"), Some(coppola));
        assert_eq!(assembler.movie("The Godfather: Part II"), Some(movie));

        let (tables, _) = assembler.snapshot();
        assert_eq!(tables.persons.len(), 1);
        assert_eq!(tables.persons[0].first_name, "Francis");
        assert_eq!(tables.movies.len(), 1);
        assert_eq!(tables.movies[0].movie_name, "The Godfather Part II");
    }

    #[test]
    fn test_integrity_check_cascades() {
        let tables = Tables {
            categories: vec![CategoryRow {
                category_id: 1,
                category_name: "Best Actress".to_string(),
            }],
            award_editions: vec![AwardEditionRow {
                award_edition_id: 45,
                edition: 45,
                year: 1973,
                ceremony_date: None,
                venue_id: None,
                duration: None,
                network: None,
            }],
            persons: vec![PersonRow {
                person_id: 1,
                first_name: "Liza".to_string(),
                middle_name: None,
                last_name: Some("Minnelli".to_string()),
                birth_date: None,
                country: None,
                death_date: None,
            }],
            nominations: vec![NominationRow {
                nomination_id: 1,
                award_edition_id: 45,
                movie_id: 99,
                category_id: 1,
                won: true,
                submitted_by: None,
            }],
            nomination_person: vec![NominationPersonRow {
                nomination_id: 1,
                person_id: 1,
            }],
            ..Tables::default()
        };

        let (checked, report) = check_integrity(tables);
        assert!(checked.nominations.is_empty());
        assert!(checked.nomination_person.is_empty());
        assert_eq!(checked.persons.len(), 1);
        assert_eq!(
            report.violations,
            vec![
                IntegrityViolation {
                    table: "nominations",
                    parent: "movies",
                    id: 99,
                },
                IntegrityViolation {
                    table: "nomination_person",
                    parent: "nominations",
                    id: 1,
                },
            ]
        );
        assert_eq!(report.by_table().get("nominations"), Some(&1));
    }
}
