//! Configuration file loading and resolution

use linkscout::config::{load_config_with_hash, parse_keywords, Overrides, ScorerKind};
use linkscout::PriorityTier;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE_CONFIG: &str = r#"
seeds = ["https://www.a2gov.org/", "https://bozeman.net/"]

[crawler]
max-depth = 3
max-pages = 50
max-links-per-page = 100

[retry]
max-attempts = 4
toggle-www = false

[keywords]
high = ["ACFR", "Budget"]
medium = ["Finance"]

[scorer]
kind = "openai"
model = "gpt-4o-mini"
calls-per-minute = 30

[output]
database-path = "./data/crawl.db"

[test-mode]
seeds = ["https://www.austintexas.gov/"]
max-pages = 3
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_resolves_to_settings() {
    let file = write_config(SAMPLE_CONFIG);
    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);

    let settings = config.resolve(&Overrides::default());
    assert_eq!(settings.seeds.len(), 2);
    assert_eq!(settings.max_depth, 3);
    assert_eq!(settings.max_pages, Some(50));
    assert_eq!(settings.max_links_per_page, 100);
    assert_eq!(settings.retry.max_attempts, 4);
    assert!(!settings.retry.toggle_www);
    assert_eq!(settings.scorer.kind, ScorerKind::OpenAi);
    assert_eq!(settings.scorer.model, "gpt-4o-mini");
    assert_eq!(settings.database_path.to_str(), Some("./data/crawl.db"));
    assert_eq!(
        settings.classifier.tier("2023 ACFR", "https://a.gov/x"),
        PriorityTier::High
    );
    assert_eq!(
        settings.classifier.tier("Finance office", "https://a.gov/x"),
        PriorityTier::Medium
    );
}

#[test]
fn test_command_line_overrides_win() {
    let file = write_config(SAMPLE_CONFIG);
    let (config, _) = load_config_with_hash(file.path()).unwrap();

    let overrides = Overrides {
        high_priority: parse_keywords("Audit, Treasurer"),
        medium_priority: Vec::new(),
        test_mode: true,
        max_depth: None,
        max_pages: Some(7),
    };
    let settings = config.resolve(&overrides);

    assert_eq!(settings.seeds, vec!["https://www.austintexas.gov/"]);
    assert_eq!(settings.max_depth, 1);
    assert_eq!(settings.max_pages, Some(7));
    assert_eq!(settings.classifier.high_keywords().count(), 2);
    assert!(settings
        .classifier
        .matches("County Treasurer office", "https://a.gov/t")
        .high
        .iter()
        .any(|k| k.eq_ignore_ascii_case("treasurer")));
}

#[test]
fn test_invalid_seed_rejected() {
    let file = write_config("seeds = [\"ftp://files.example.com/\"]\n");
    assert!(load_config_with_hash(file.path()).is_err());
}
