//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve category, film and person pages and
//! run the coordinator end-to-end into CSV files in a temporary directory.

use oscar_ledger::config::{
    CategoryEntry, Config, EditionsConfig, FetcherConfig, OutputConfig, UserAgentConfig,
};
use oscar_ledger::crawler::{Coordinator, Fetcher};
use oscar_ledger::output::{read_table, CsvSink};
use oscar_ledger::schema::tables::{
    CategoryRow, MovieRow, NominationPersonRow, NominationRow, PersonRow,
};
use oscar_ledger::state::PageState;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with one category listed at `urls`
fn create_test_config(urls: Vec<String>, output_dir: &Path) -> Config {
    Config {
        fetcher: FetcherConfig {
            delay_ms: 0,
            max_retries: 2,
            backoff_ms: 10,
            backoff_multiplier: 2.0,
            timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        editions: EditionsConfig {
            first_year: 1929,
            count: 96,
            fetch_ceremonies: false,
            ceremony_url_template: "https://en.wikipedia.org/wiki/{ordinal}_Academy_Awards"
                .to_string(),
        },
        output: OutputConfig {
            directory: output_dir.display().to_string(),
            summary_file: "run_summary.md".to_string(),
            delimiter: ",".to_string(),
            flush_every: 0,
        },
        categories: vec![CategoryEntry {
            name: "Best Picture".to_string(),
            urls,
        }],
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/html; charset=UTF-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

const CATEGORY_PAGE: &str = r#"<html><body>
    <h1>Academy Award for Best Picture</h1>
    <h2>1970s</h2>
    <table class="wikitable">
      <tr><th>Year</th><th>Film</th><th>Producer(s)</th></tr>
      <tr style="background:#FAEB86">
        <td rowspan="2"><a href="/wiki/1972_in_film">1972</a> (45th)</td>
        <td><a href="/wiki/Film_Alpha">Film Alpha</a></td>
        <td><a href="/wiki/Ann_Producer">Ann Producer</a></td>
      </tr>
      <tr>
        <td><a href="/wiki/Film_Beta">Film Beta</a></td>
        <td>Bob Maker and Cy Maker</td>
      </tr>
    </table>
    </body></html>"#;

const FILM_ALPHA: &str = r#"<html><body>
    <h1>Film Alpha</h1>
    <table class="infobox">
      <tr><th>Directed by</th><td><a href="/wiki/Dee_Director">Dee Director</a></td></tr>
      <tr><th>Running time</th><td>142 minutes</td></tr>
      <tr><th>Language</th><td>English</td></tr>
    </table>
    </body></html>"#;

const FILM_BETA: &str = r#"<html><body>
    <h1>Film Beta</h1>
    <table class="infobox">
      <tr><th>Running time</th><td>118 min</td></tr>
      <tr><th>Release date</th><td>March 14, 1972</td></tr>
    </table>
    </body></html>"#;

const ANN_PRODUCER: &str = r#"<html><body>
    <h1>Ann Producer</h1>
    <table class="infobox">
      <tr><th>Born</th><td>June 1, 1930<br>Boston, Massachusetts, U.S.</td></tr>
    </table>
    </body></html>"#;

#[tokio::test]
async fn test_full_scrape_writes_tables() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let output = TempDir::new().unwrap();

    mount_page(&server, "/wiki/Academy_Award_for_Best_Picture", CATEGORY_PAGE).await;
    mount_page(&server, "/wiki/Film_Alpha", FILM_ALPHA).await;
    mount_page(&server, "/wiki/Film_Beta", FILM_BETA).await;
    mount_page(&server, "/wiki/Ann_Producer", ANN_PRODUCER).await;

    let config = create_test_config(
        vec![format!("{}/wiki/Academy_Award_for_Best_Picture", base_url)],
        output.path(),
    );
    let fetcher = Fetcher::from_config(&config.fetcher, &config.user_agent).unwrap();
    let sink = CsvSink::from_config(&config.output).unwrap();

    let summary = Coordinator::new(config, "test-hash", fetcher, sink)
        .run()
        .await
        .expect("scrape should succeed");

    assert_eq!(summary.pages_in(PageState::Processed), 4);
    assert_eq!(summary.nominations_parsed, 2);
    assert!(summary.integrity_drops.is_empty());

    let dir = output.path();
    let movies: Vec<MovieRow> = read_table(&dir.join("movies.csv"), b',').unwrap();
    assert_eq!(movies.len(), 2);
    let alpha = movies.iter().find(|m| m.movie_name == "Film Alpha").unwrap();
    let beta = movies.iter().find(|m| m.movie_name == "Film Beta").unwrap();
    assert_eq!(alpha.run_time, Some(142));
    assert_eq!(beta.run_time, Some(118));

    let categories: Vec<CategoryRow> = read_table(&dir.join("categories.csv"), b',').unwrap();
    assert_eq!(categories.len(), 1);
    let category_id = categories[0].category_id;

    let nominations: Vec<NominationRow> = read_table(&dir.join("nominations.csv"), b',').unwrap();
    assert_eq!(nominations.len(), 2);
    let won: Vec<&NominationRow> = nominations.iter().filter(|n| n.won).collect();
    assert_eq!(won.len(), 1);
    assert_eq!(won[0].movie_id, alpha.movie_id);
    let lost = nominations.iter().find(|n| !n.won).unwrap();
    assert_eq!(lost.movie_id, beta.movie_id);
    for nomination in &nominations {
        assert_eq!(nomination.category_id, category_id);
        assert_eq!(nomination.award_edition_id, 45);
    }

    let persons: Vec<PersonRow> = read_table(&dir.join("persons.csv"), b',').unwrap();
    let ann = persons.iter().find(|p| p.first_name == "Ann").unwrap();
    assert_eq!(ann.last_name.as_deref(), Some("Producer"));
    assert_eq!(ann.country.as_deref(), Some("United States"));
    assert!(persons.iter().any(|p| p.first_name == "Dee"));
    assert!(persons.iter().any(|p| p.first_name == "Cy"));

    let nominees: Vec<NominationPersonRow> =
        read_table(&dir.join("nomination_person.csv"), b',').unwrap();
    assert_eq!(nominees.len(), 3);

    assert!(dir.join("run_summary.md").exists());
    for table in oscar_ledger::output::LOAD_ORDER {
        assert!(dir.join(format!("{}.csv", table)).exists(), "missing {}", table);
    }
}

#[tokio::test]
async fn test_fallback_url_and_transient_retry() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wiki/Moved_Page"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/wiki/List_of_Best_Picture_nominees", CATEGORY_PAGE).await;

    Mock::given(method("GET"))
        .and(path("/wiki/Film_Alpha"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/wiki/Film_Alpha", FILM_ALPHA).await;

    let config = create_test_config(
        vec![
            format!("{}/wiki/Moved_Page", base_url),
            format!("{}/wiki/List_of_Best_Picture_nominees", base_url),
        ],
        output.path(),
    );
    let fetcher = Fetcher::from_config(&config.fetcher, &config.user_agent).unwrap();
    let sink = CsvSink::from_config(&config.output).unwrap();

    let summary = Coordinator::new(config, "test-hash", fetcher, sink)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.category_fallbacks, 1);
    assert_eq!(summary.nominations_parsed, 2);
    // Moved_Page, Film_Beta and Ann_Producer are not served
    assert_eq!(summary.pages_in(PageState::DeadLink), 3);

    let movies: Vec<MovieRow> = read_table(&output.path().join("movies.csv"), b',').unwrap();
    let alpha = movies.iter().find(|m| m.movie_name == "Film Alpha").unwrap();
    assert_eq!(alpha.run_time, Some(142));
    let beta = movies.iter().find(|m| m.movie_name == "Film Beta").unwrap();
    assert_eq!(beta.run_time, None);

    let markdown = std::fs::read_to_string(output.path().join("run_summary.md")).unwrap();
    assert!(markdown.contains("Moved_Page"));
}
