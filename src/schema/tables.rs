//! Row types of the emitted tables
//!
//! Field order is the column order of the CSV files. `None` fields are
//! written as empty strings.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Surrogate key of any entity
pub type Id = u32;

/// A row type that maps onto one output table
pub trait TableRow: Serialize + DeserializeOwned {
    /// Table (and file stem) name
    const NAME: &'static str;

    /// Column headers in file order
    const COLUMNS: &'static [&'static str];
}

macro_rules! table_row {
    ($row:ty, $name:literal, [$($column:literal),+ $(,)?]) => {
        impl TableRow for $row {
            const NAME: &'static str = $name;
            const COLUMNS: &'static [&'static str] = &[$($column),+];
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRow {
    pub venue_id: Id,
    pub venue_name: String,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}
table_row!(VenueRow, "venues", ["venue_id", "venue_name", "neighborhood", "city", "state", "country"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRow {
    pub position_id: Id,
    pub title: String,
}
table_row!(PositionRow, "positions", ["position_id", "title"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRow {
    pub person_id: Id,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "birthDate")]
    pub birth_date: Option<NaiveDate>,
    pub country: Option<String>,
    #[serde(rename = "deathDate")]
    pub death_date: Option<NaiveDate>,
}
table_row!(
    PersonRow,
    "persons",
    ["person_id", "first_name", "middle_name", "last_name", "birthDate", "country", "deathDate"]
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEditionRow {
    pub award_edition_id: Id,
    pub edition: u32,
    #[serde(rename = "aYear")]
    pub year: i32,
    #[serde(rename = "cDate")]
    pub ceremony_date: Option<NaiveDate>,
    pub venue_id: Option<Id>,
    /// Minutes
    pub duration: Option<u32>,
    pub network: Option<String>,
}
table_row!(
    AwardEditionRow,
    "award_editions",
    ["award_edition_id", "edition", "aYear", "cDate", "venue_id", "duration", "network"]
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AwardEditionPersonRow {
    pub award_edition_id: Id,
    pub person_id: Id,
    pub position_id: Id,
}
table_row!(AwardEditionPersonRow, "award_edition_person", ["award_edition_id", "person_id", "position_id"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category_id: Id,
    pub category_name: String,
}
table_row!(CategoryRow, "categories", ["category_id", "category_name"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRow {
    pub movie_id: Id,
    pub movie_name: String,
    /// Minutes
    pub run_time: Option<u32>,
}
table_row!(MovieRow, "movies", ["movie_id", "movie_name", "run_time"]);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieLanguageRow {
    pub movie_id: Id,
    pub in_language: String,
}
table_row!(MovieLanguageRow, "movie_language", ["movie_id", "in_language"]);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieReleaseDateRow {
    pub movie_id: Id,
    pub release_date: NaiveDate,
}
table_row!(MovieReleaseDateRow, "movie_release_date", ["movie_id", "release_date"]);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieCountryRow {
    pub movie_id: Id,
    pub country: String,
}
table_row!(MovieCountryRow, "movie_country", ["movie_id", "country"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompanyRow {
    pub pd_id: Id,
    pub company_name: String,
}
table_row!(ProductionCompanyRow, "production_company", ["pd_id", "company_name"]);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieProducedByRow {
    pub movie_id: Id,
    pub production_company_id: Id,
}
table_row!(MovieProducedByRow, "movie_produced_by", ["movie_id", "production_company_id"]);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieCrewRow {
    pub movie_id: Id,
    pub person_id: Id,
    pub position_id: Id,
}
table_row!(MovieCrewRow, "movie_crew", ["movie_id", "person_id", "position_id"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationRow {
    pub nomination_id: Id,
    pub award_edition_id: Id,
    pub movie_id: Id,
    pub category_id: Id,
    #[serde(with = "int_bool")]
    pub won: bool,
    pub submitted_by: Option<String>,
}
table_row!(
    NominationRow,
    "nominations",
    ["nomination_id", "award_edition_id", "movie_id", "category_id", "won", "submitted_by"]
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NominationPersonRow {
    pub nomination_id: Id,
    pub person_id: Id,
}
table_row!(NominationPersonRow, "nomination_person", ["nomination_id", "person_id"]);

/// Booleans as `1`/`0`
mod int_bool {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::custom(format!("expected 0 or 1, got {}", other))),
        }
    }
}

/// One complete set of output rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub venues: Vec<VenueRow>,
    pub positions: Vec<PositionRow>,
    pub persons: Vec<PersonRow>,
    pub award_editions: Vec<AwardEditionRow>,
    pub award_edition_person: Vec<AwardEditionPersonRow>,
    pub categories: Vec<CategoryRow>,
    pub movies: Vec<MovieRow>,
    pub movie_language: Vec<MovieLanguageRow>,
    pub movie_release_date: Vec<MovieReleaseDateRow>,
    pub movie_country: Vec<MovieCountryRow>,
    pub production_company: Vec<ProductionCompanyRow>,
    pub movie_produced_by: Vec<MovieProducedByRow>,
    pub movie_crew: Vec<MovieCrewRow>,
    pub nominations: Vec<NominationRow>,
    pub nomination_person: Vec<NominationPersonRow>,
}

/// Table names in the order a bulk loader must insert them
pub const LOAD_ORDER: [&str; 15] = [
    VenueRow::NAME,
    PositionRow::NAME,
    PersonRow::NAME,
    AwardEditionRow::NAME,
    AwardEditionPersonRow::NAME,
    CategoryRow::NAME,
    MovieRow::NAME,
    MovieLanguageRow::NAME,
    MovieReleaseDateRow::NAME,
    MovieCountryRow::NAME,
    ProductionCompanyRow::NAME,
    MovieProducedByRow::NAME,
    MovieCrewRow::NAME,
    NominationRow::NAME,
    NominationPersonRow::NAME,
];

impl Tables {
    /// Row count of every table, in load order
    pub fn row_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            (VenueRow::NAME, self.venues.len()),
            (PositionRow::NAME, self.positions.len()),
            (PersonRow::NAME, self.persons.len()),
            (AwardEditionRow::NAME, self.award_editions.len()),
            (AwardEditionPersonRow::NAME, self.award_edition_person.len()),
            (CategoryRow::NAME, self.categories.len()),
            (MovieRow::NAME, self.movies.len()),
            (MovieLanguageRow::NAME, self.movie_language.len()),
            (MovieReleaseDateRow::NAME, self.movie_release_date.len()),
            (MovieCountryRow::NAME, self.movie_country.len()),
            (ProductionCompanyRow::NAME, self.production_company.len()),
            (MovieProducedByRow::NAME, self.movie_produced_by.len()),
            (MovieCrewRow::NAME, self.movie_crew.len()),
            (NominationRow::NAME, self.nominations.len()),
            (NominationPersonRow::NAME, self.nomination_person.len()),
        ]
    }

    pub fn total_rows(&self) -> usize {
        self.row_counts().iter().map(|(_, count)| count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_order_matches_row_counts() {
        let names: Vec<&str> = Tables::default()
            .row_counts()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, LOAD_ORDER.to_vec());
    }

    #[test]
    fn test_column_names() {
        assert_eq!(PersonRow::COLUMNS[4], "birthDate");
        assert_eq!(PersonRow::COLUMNS[6], "deathDate");
        assert_eq!(AwardEditionRow::COLUMNS[2], "aYear");
        assert_eq!(ProductionCompanyRow::COLUMNS, &["pd_id", "company_name"]);
        assert_eq!(NominationRow::COLUMNS.len(), 6);
    }

    #[test]
    fn test_total_rows() {
        let tables = Tables {
            positions: vec![PositionRow {
                position_id: 1,
                title: "Director".to_string(),
            }],
            categories: vec![CategoryRow {
                category_id: 1,
                category_name: "Best Picture".to_string(),
            }],
            ..Tables::default()
        };
        assert_eq!(tables.total_rows(), 2);
    }
}
