//! Feeds parsed pages into the assembler
//!
//! These functions hold no state of their own; the coordinator passes in
//! the assembler it owns, which keeps them usable from fixture tests.

use crate::extract::{CategoryPage, CeremonyDetails, MovieDetails, PersonDetails};
use crate::schema::{Assembler, Id};
use url::Url;

/// Category name fragments and the job title their nominees held
///
/// Checked in order, so more specific fragments come first.
const NOMINEE_POSITIONS: &[(&str, &str)] = &[
    ("supporting actor", "Supporting Actor"),
    ("supporting actress", "Supporting Actress"),
    ("actor", "Actor"),
    ("actress", "Actress"),
    ("director", "Director"),
    ("directing", "Director"),
    ("screenplay", "Writer"),
    ("writing", "Writer"),
    ("cinematography", "Cinematographer"),
    ("film editing", "Editor"),
    ("score", "Composer"),
    ("song", "Composer"),
    ("production design", "Art Director"),
    ("art direction", "Art Director"),
    ("visual effects", "Visual Effects Artist"),
    ("makeup", "Makeup Artist"),
    ("sound", "Sound Designer"),
    ("picture", "Producer"),
];

/// Job title implied by being nominated in a category
pub fn nominee_position(category: &str) -> Option<&'static str> {
    let category = category.to_lowercase();
    NOMINEE_POSITIONS
        .iter()
        .find(|(fragment, _)| category.contains(fragment))
        .map(|(_, position)| *position)
}

/// What one category page added, and the detail pages it pointed to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryOutcome {
    /// Entries that produced (or repeated) a nomination
    pub nominations: usize,

    /// Entries dropped because their title had no usable text
    pub rejected: usize,

    pub movie_links: Vec<(Id, Url)>,
    pub person_links: Vec<(Id, Url)>,
}

/// Records every entry of a category page
///
/// Each entry resolves its edition, movie and people, then adds one
/// nomination and its nominee rows. Nominees are also credited on the film
/// under the position the category implies.
pub fn ingest_category_page(
    assembler: &mut Assembler,
    category: &str,
    page: &CategoryPage,
) -> CategoryOutcome {
    let mut outcome = CategoryOutcome::default();

    let Some(category_id) = assembler.category(category) else {
        tracing::warn!("Category name {:?} has no usable text", category);
        return outcome;
    };
    let position_id = nominee_position(category).and_then(|title| assembler.position(title));

    for entry in &page.entries {
        let Some(movie_id) = assembler.movie(&entry.film_title) else {
            outcome.rejected += 1;
            continue;
        };
        let edition_id = assembler.edition(entry.edition);
        let nomination_id = assembler.nominate(
            edition_id,
            category_id,
            movie_id,
            entry.won,
            entry.submitted_by.as_deref(),
        );
        outcome.nominations += 1;

        if let Some(url) = &entry.film_url {
            outcome.movie_links.push((movie_id, url.clone()));
        }

        for person in &entry.people {
            let Some(person_id) = assembler.person(&person.name) else {
                continue;
            };
            assembler.credit_nominee(nomination_id, person_id);
            if let Some(position_id) = position_id {
                assembler.credit_crew(movie_id, person_id, position_id);
            }
            if let Some(url) = &person.url {
                outcome.person_links.push((person_id, url.clone()));
            }
        }
    }

    outcome
}

pub fn ingest_movie_page(assembler: &mut Assembler, movie_id: Id, details: &MovieDetails) {
    assembler.enrich_movie(movie_id, details);
}

pub fn ingest_person_page(assembler: &mut Assembler, person_id: Id, details: &PersonDetails) {
    assembler.enrich_person(person_id, details);
}

/// Records a ceremony page against its edition
pub fn ingest_ceremony_page(assembler: &mut Assembler, edition: u32, details: &CeremonyDetails) {
    let edition_id = assembler.edition(edition);
    assembler.enrich_edition(edition_id, details);
}
