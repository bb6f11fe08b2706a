//! End-to-end scenarios: records in, query outcomes out.

use pretty_assertions::assert_eq;
use statsdb::{LoadOptions, QueryOutcome, Record, SearchOptions, StatsDb, StatsError, Tag};

fn load(records: Vec<Record>) -> StatsDb {
    StatsDb::from_records(records, &LoadOptions::default()).expect("records should load")
}

#[test]
fn test_speed_times_time_gives_distance() {
    let db = load(vec![
        Record::new("Speed", "m/s", "10", "#kin"),
        Record::new("Time", "s", "5", "#kin"),
    ]);

    let outcome = db
        .query("m", Some("#kin"), &SearchOptions::default())
        .unwrap();

    assert!(
        outcome
            .matches()
            .iter()
            .any(|m| (m.product.value() - 50.0).abs() < 1e-9),
        "expected Speed * Time = 50 among {:?}",
        outcome.matches()
    );
}

#[test]
fn test_equivalence_derives_fully_matched_quantity() {
    let db = load(vec![
        Record::new("Power", "J/s", "100", "#e"),
        Record::new("W", "=", "J/s", "#e"),
    ]);

    let derived: Vec<_> = db.find("W").collect();
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0].value(), 100.0);
    assert!(derived[0].numerator().is_empty());
    assert!(derived[0].denominator().is_empty());

    let inverse: Vec<_> = db.find("W_gen").collect();
    assert_eq!(inverse.len(), 1);
    assert!((inverse[0].value() - 0.01).abs() < 1e-12);
}

#[test]
fn test_unreachable_dimension_reports_no_match() {
    let db = load(vec![
        Record::new("Speed", "m/s", "10", "#kin"),
        Record::new("Time", "s", "5", "#kin"),
    ]);

    let outcome = db
        .query("kg.m/s.s", Some("#kin"), &SearchOptions::default())
        .unwrap();

    assert!(matches!(outcome, QueryOutcome::NoMatch { .. }));
    assert!(outcome.matches().is_empty());
}

#[test]
fn test_network_energy_per_packet() {
    // Energy per packet from a power draw and a packet rate.
    let db = load(vec![
        Record::new("Link power", "J/s", "2", "#PAP"),
        Record::new("Packet rate", "pkt/s", "1000", "#PAP"),
        Record::new("Core clock", "Hz", "3e9", "#CX"),
    ]);

    let outcome = db
        .query("J/pkt", Some("#PAP"), &SearchOptions::default())
        .unwrap();

    let found = outcome
        .matches()
        .iter()
        .find(|m| m.factors == vec!["Link power", "Packet rate_gen"])
        .expect("Link power / Packet rate should match");
    assert!((found.product.value() - 0.002).abs() < 1e-12);
}

#[test]
fn test_multi_tag_filter_is_a_union() {
    let db = load(vec![
        Record::new("Ops", "Op", "8", "#CX"),
        Record::new("Clock", "Hz", "2", "#CX #TX"),
        Record::new("Lanes", "lane", "4", "#TX"),
    ]);

    let outcome = db
        .query("Op.Hz", Some("#CX#TX"), &SearchOptions::default())
        .unwrap();
    assert_eq!(outcome.matches().len(), 1);
    assert_eq!(outcome.matches()[0].factors, vec!["Ops", "Clock"]);
    assert_eq!(outcome.total().map(|t| t.value()), Some(16.0));

    let subset = db.subset(&[Tag::new("TX")]).unwrap();
    let names: Vec<_> = subset.quantities().map(|(_, q)| q.name()).collect();
    assert_eq!(names, vec!["Clock", "Clock_gen", "Lanes", "Lanes_gen"]);
}

#[test]
fn test_bad_record_does_not_corrupt_database() {
    let mut db = load(vec![Record::new("Time", "s", "5", "#t")]);

    let result = db.load(
        vec![Record::new("Broken", "m/(s)", "1", "#t")],
        &LoadOptions::default(),
    );
    assert!(matches!(result, Err(StatsError::Record { .. })));
    assert_eq!(db.len(), 2);

    let outcome = db.query("s", Some("#t"), &SearchOptions::default()).unwrap();
    assert_eq!(outcome.matches().len(), 1);
}
