//! CSV table sink
//!
//! One file per table, header first, fields quoted only when needed.
//! `None` is written as an empty field and read back as `None`.

use crate::config::OutputConfig;
use crate::output::traits::{OutputError, OutputResult, TableSink, TableWritten, WriteReport};
use crate::schema::{TableRow, Tables};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes tables as CSV files into one directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
    delimiter: u8,
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            directory: directory.into(),
            delimiter,
        }
    }

    /// Builds a sink from the output section of the configuration
    pub fn from_config(config: &OutputConfig) -> OutputResult<Self> {
        let delimiter = parse_delimiter(&config.delimiter)?;
        Ok(Self::new(&config.directory, delimiter))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// File a table is written to
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", name))
    }

    fn write_table<R: TableRow>(&self, rows: &[R]) -> OutputResult<TableWritten> {
        let path = self.table_path(R::NAME);
        let partial = self.directory.join(format!(".{}.csv.partial", R::NAME));

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .quote_style(QuoteStyle::Necessary)
            .from_path(&partial)?;

        writer.write_record(R::COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&partial, &path)?;
        tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());

        Ok(TableWritten {
            name: R::NAME,
            path,
            rows: rows.len(),
        })
    }
}

impl TableSink for CsvSink {
    fn write_tables(&mut self, tables: &Tables) -> OutputResult<WriteReport> {
        fs::create_dir_all(&self.directory)?;

        let written = vec![
            self.write_table(&tables.venues)?,
            self.write_table(&tables.positions)?,
            self.write_table(&tables.persons)?,
            self.write_table(&tables.award_editions)?,
            self.write_table(&tables.award_edition_person)?,
            self.write_table(&tables.categories)?,
            self.write_table(&tables.movies)?,
            self.write_table(&tables.movie_language)?,
            self.write_table(&tables.movie_release_date)?,
            self.write_table(&tables.movie_country)?,
            self.write_table(&tables.production_company)?,
            self.write_table(&tables.movie_produced_by)?,
            self.write_table(&tables.movie_crew)?,
            self.write_table(&tables.nominations)?,
            self.write_table(&tables.nomination_person)?,
        ];

        Ok(WriteReport { tables: written })
    }
}

/// Reads a table file written by [`CsvSink`]
///
/// The header must match the row type's columns exactly.
pub fn read_table<R: TableRow>(path: &Path, delimiter: u8) -> OutputResult<Vec<R>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)?;

    let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if found != R::COLUMNS {
        return Err(OutputError::Header {
            table: R::NAME.to_string(),
            expected: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            found,
        });
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

fn parse_delimiter(raw: &str) -> OutputResult<u8> {
    match raw.as_bytes() {
        [byte] if byte.is_ascii() && !matches!(byte, b'"' | b'\r' | b'\n') => Ok(*byte),
        _ => Err(OutputError::Format(format!(
            "delimiter must be a single ASCII character, got {:?}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{MovieRow, NominationRow, PersonRow, VenueRow};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_tables() -> Tables {
        Tables {
            movies: vec![
                MovieRow {
                    movie_id: 1,
                    movie_name: "Crouching Tiger, Hidden Dragon".to_string(),
                    run_time: Some(120),
                },
                MovieRow {
                    movie_id: 2,
                    movie_name: "The \"Sound\" of Music".to_string(),
                    run_time: None,
                },
            ],
            persons: vec![PersonRow {
                person_id: 1,
                first_name: "Ang".to_string(),
                middle_name: None,
                last_name: Some("Lee".to_string()),
                birth_date: NaiveDate::from_ymd_opt(1954, 10, 23),
                country: Some("Taiwan".to_string()),
                death_date: None,
            }],
            nominations: vec![NominationRow {
                nomination_id: 1,
                award_edition_id: 73,
                movie_id: 1,
                category_id: 1,
                won: true,
                submitted_by: Some("Taiwan".to_string()),
            }],
            ..Tables::default()
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvSink::new(dir.path(), b',');
        let tables = sample_tables();

        let report = sink.write_tables(&tables).unwrap();
        assert_eq!(report.tables.len(), 15);
        assert_eq!(report.rows_for("movies"), Some(2));

        let movies: Vec<MovieRow> = read_table(&sink.table_path("movies"), b',').unwrap();
        assert_eq!(movies, tables.movies);

        let persons: Vec<PersonRow> = read_table(&sink.table_path("persons"), b',').unwrap();
        assert_eq!(persons, tables.persons);

        let nominations: Vec<NominationRow> =
            read_table(&sink.table_path("nominations"), b',').unwrap();
        assert_eq!(nominations, tables.nominations);
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvSink::new(dir.path(), b',');
        sink.write_tables(&sample_tables()).unwrap();

        let movies = fs::read_to_string(sink.table_path("movies")).unwrap();
        let lines: Vec<&str> = movies.lines().collect();
        assert_eq!(lines[0], "movie_id,movie_name,run_time");
        assert_eq!(lines[1], "1,\"Crouching Tiger, Hidden Dragon\",120");
        assert_eq!(lines[2], "2,\"The \"\"Sound\"\" of Music\",");

        let persons = fs::read_to_string(sink.table_path("persons")).unwrap();
        assert!(persons.starts_with(
            "person_id,first_name,middle_name,last_name,birthDate,country,deathDate\n"
        ));
        assert!(persons.contains("1,Ang,,Lee,1954-10-23,Taiwan,\n"));

        let nominations = fs::read_to_string(sink.table_path("nominations")).unwrap();
        assert!(nominations.contains("1,73,1,1,1,Taiwan"));

        let venues = fs::read_to_string(sink.table_path("venues")).unwrap();
        assert_eq!(venues, "venue_id,venue_name,neighborhood,city,state,country\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvSink::new(dir.path(), b'|');
        sink.write_tables(&sample_tables()).unwrap();

        let movies = fs::read_to_string(sink.table_path("movies")).unwrap();
        assert!(movies.contains("1|Crouching Tiger, Hidden Dragon|120"));

        let read: Vec<MovieRow> = read_table(&sink.table_path("movies"), b'|').unwrap();
        assert_eq!(read.len(), 2);
    }

    #[test]
    fn test_rewrite_replaces_previous_files() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvSink::new(dir.path(), b',');
        sink.write_tables(&sample_tables()).unwrap();
        sink.write_tables(&Tables::default()).unwrap();

        let movies: Vec<MovieRow> = read_table(&sink.table_path("movies"), b',').unwrap();
        assert!(movies.is_empty());
        assert!(!dir.path().join(".movies.csv.partial").exists());
    }

    #[test]
    fn test_read_rejects_wrong_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("venues.csv");
        fs::write(&path, "id,name\n1,Shrine Auditorium\n").unwrap();

        let result: OutputResult<Vec<VenueRow>> = read_table(&path, b',');
        assert!(matches!(result, Err(OutputError::Header { .. })));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
        assert!(parse_delimiter("\"").is_err());
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("é").is_err());
    }
}
