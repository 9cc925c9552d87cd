#![allow(missing_docs)]

use std::fs;
use std::sync::Once;

use larder::cli::ImportError;
use larder::{Dataset, DatasetOptions, Indexed, LarderError, Record, Result};
use tempfile::tempdir;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("larder=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

fn apple() -> Record {
    Record::new("12345", "Apple")
        .with_attribute("calories", 95.0)
        .with_attribute("fat", 0.3)
        .with_attribute("carbohydrate", 25.1)
        .with_attribute("fiber", 4.4)
        .with_attribute("protein", 0.47)
}

#[test]
fn save_then_load_reproduces_record() -> Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("foods.csv");

    let mut original = Dataset::new(DatasetOptions::default())?;
    original.add_record(apple())?;
    assert_eq!(original.save(&path)?, 1);

    let mut reloaded = Dataset::new(DatasetOptions::default())?;
    let summary = reloaded.load(&path)?;
    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.skipped, 0);
    let record = reloaded.find("12345").expect("record survives the round trip");
    assert_eq!(record.as_ref(), &apple());
    Ok(())
}

#[test]
fn unparsable_value_keeps_previous_dataset() -> Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let good = dir.path().join("good.csv");
    let bad = dir.path().join("bad.csv");
    fs::write(&good, "1,Oats,calories,389,protein,16.9\n2,Rice,calories,130\n")?;
    fs::write(&bad, "3,Bread,calories,265\n4,Jam,calories,two hundred\n")?;

    let mut dataset = Dataset::new(DatasetOptions::default())?;
    dataset.load(&good)?;
    let err = dataset.load(&bad).unwrap_err();
    assert!(matches!(
        err,
        LarderError::Import(ImportError::InvalidNumber { line: 2, .. })
    ));

    let names: Vec<&str> = dataset.records().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Oats", "Rice"]);
    assert_eq!(dataset.filter_by_rules(&["calories >= 200"])?.len(), 1);
    assert!(dataset.find("3").is_none());
    Ok(())
}

#[test]
fn missing_file_keeps_previous_dataset() -> Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let good = dir.path().join("good.csv");
    fs::write(&good, "1,Oats,calories,389\n")?;

    let mut dataset = Dataset::new(DatasetOptions::default())?;
    dataset.load(&good)?;
    let err = dataset.load(dir.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, LarderError::Import(ImportError::Open { .. })));
    assert_eq!(dataset.len(), 1);
    Ok(())
}

#[test]
fn reload_replaces_records_and_indexes() -> Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    fs::write(&first, "1,Oats,protein,16.9\n2,Tofu,protein,8\n")?;
    fs::write(&second, "3,Lentils,protein,9\nnot-a-record\n")?;

    let mut dataset = Dataset::new(DatasetOptions::default())?;
    dataset.load(&first)?;
    let summary = dataset.load(&second)?;
    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.skipped, 1);

    let found = dataset.filter_by_rules(&["protein >= 0"])?;
    let ids: Vec<&str> = found.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["3"]);
    Ok(())
}

#[test]
fn custom_attributes_from_toml() -> Result<()> {
    init_tracing();
    let dir = tempdir()?;
    let config = dir.path().join("larder.toml");
    let data = dir.path().join("drinks.csv");
    fs::write(&config, "branching_factor = 4\nattributes = [\"Sugar\", \"caffeine\"]\n")?;
    fs::write(&data, "1,Cola,SUGAR,39,caffeine,34\n2,Tea,caffeine,47\n3,Juice,sugar,24\n")?;

    let options = DatasetOptions::from_toml_file(&config)?;
    let mut dataset = Dataset::new(options)?;
    dataset.load(&data)?;
    assert_eq!(dataset.registry().attributes(), ["sugar", "caffeine"]);
    assert_eq!(dataset.registry().branching_factor(), 4);

    let found = dataset.filter_by_rules(&["sugar >= 30", "caffeine >= 30"])?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "Cola");

    let err = dataset.filter_by_rules(&["calories <= 10"]).unwrap_err();
    assert!(matches!(err, LarderError::Query(_)));
    Ok(())
}
