#[path = "common/mod.rs"]
mod common;

use common::*;
use serde_json::json;
use tetl::{parse_created_at, parse_records, AliasTable, DateError, Day, LocationSource, RawRecord, Rejection, Resolver};

fn resolve(v: serde_json::Value) -> Result<tetl::Observation, Rejection> {
    let catalog = tiny_catalog();
    let aliases = AliasTable::build(&catalog);
    let resolver = Resolver::new(&catalog, &aliases);
    resolver.resolve(&RawRecord::from_value(&v))
}

/// A geotagged record resolves through the catalog code; the free-text location is ignored
/// even when it names another country.
#[test]
fn place_code_beats_free_text() {
    let mut v = place_record("Sat May 01 10:00:00 +0000 2021", "DE", "Deutschland");
    v["user"]["location"] = json!("Paris, France");

    let obs = resolve(v).unwrap();
    assert_eq!(obs.day, day(2021, 5, 1));
    assert_eq!(obs.country, "germany");
    assert_eq!(obs.original, "Deutschland");
    assert_eq!(obs.source, LocationSource::Place);
}

/// Codes are matched case-insensitively; `original` falls back to the code when
/// `place.country` is missing.
#[test]
fn lowercase_code_without_country_text() {
    let v = json!({
        "created_at": "2021-05-01T10:00:00Z",
        "place": {"country_code": "us"},
        "user": {"location": null}
    });
    let obs = resolve(v).unwrap();
    assert_eq!(obs.country, "united states of america");
    assert_eq!(obs.original, "us");
}

/// An unknown place code does not reject the record: free text is tried next.
#[test]
fn unknown_code_falls_back_to_location() {
    let mut v = place_record("2021-05-01", "ZZ", "Nowhere");
    v["user"]["location"] = json!("Kano, Najeriya");

    let obs = resolve(v).unwrap();
    assert_eq!(obs.country, "nigeria");
    assert_eq!(obs.original, "Kano, Najeriya");
    assert_eq!(obs.source, LocationSource::FreeText);
}

/// Free-text matching is a case-insensitive substring test; "usa" is always an alias.
#[test]
fn free_text_alias_substring() {
    let obs = resolve(location_record("2021-05-01", "Austin, TX, USA")).unwrap();
    assert_eq!(obs.country, "united states of america");

    let obs = resolve(location_record("2021-05-01", "somewhere in NIGERIA")).unwrap();
    assert_eq!(obs.country, "nigeria");
}

/// Each rejection reason, checked in order: date first, then location.
#[test]
fn rejection_reasons() {
    let missing = json!({"place": {"country_code": "DE"}});
    assert_eq!(resolve(missing), Err(Rejection::MissingDate));

    let bad = place_record("not a date", "DE", "Germany");
    assert_eq!(resolve(bad), Err(Rejection::UnparsableDate { input: "not a date".into() }));

    let nowhere = location_record("2021-05-01", "The Moon");
    assert_eq!(resolve(nowhere), Err(Rejection::UnresolvableLocation));

    let no_location = json!({"created_at": "2021-05-01", "place": null, "user": {"location": null}});
    assert_eq!(resolve(no_location), Err(Rejection::UnresolvableLocation));

    // a bad date wins over a bad location
    let both = location_record("yesterday", "The Moon");
    assert!(matches!(resolve(both), Err(Rejection::UnparsableDate { .. })));
}

/// Wrong-typed fields read as absent instead of failing the file.
#[test]
fn lenient_field_extraction() {
    let v = json!({
        "created_at": 1619863200,
        "place": "Berlin",
        "user": {"location": 42}
    });
    let rec = RawRecord::from_value(&v);
    assert_eq!(rec.created_at.as_deref(), Some("1619863200"));
    assert_eq!(rec.place, None);
    assert_eq!(rec.user_location, None);

    let rec = RawRecord::from_value(&json!("just a string"));
    assert_eq!(rec, RawRecord::default());
}

/// The input document must be an object with a `records` array.
#[test]
fn document_shape_is_checked() {
    let recs = parse_records(r#"{"records": [{"created_at": "2021-05-01"}, {}]}"#).unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1], RawRecord::default());

    assert!(parse_records(r#"{"records": []}"#).unwrap().is_empty());
    assert!(parse_records(r#"[1, 2, 3]"#).is_err());
    assert!(parse_records(r#"{"tweets": []}"#).is_err());
    assert!(parse_records(r#"{"records": {"a": 1}}"#).is_err());
    assert!(parse_records("{ not json").is_err());
    assert!(parse_records([0xff_u8, 0xfe, 0x00]).is_err());
}

/// The day is taken in the timestamp's own offset, with no conversion to UTC.
#[test]
fn date_truncates_in_own_offset() {
    assert_eq!(parse_created_at("Sat May 01 23:30:00 -0500 2021").unwrap(), day(2021, 5, 1));
    assert_eq!(parse_created_at("2021-05-01T23:30:00-05:00").unwrap(), day(2021, 5, 1));
    assert_eq!(parse_created_at("2021-05-02T00:30:00+02:00").unwrap(), day(2021, 5, 2));
}

/// Layouts the parser accepts.
#[test]
fn date_layouts() {
    let may1 = day(2021, 5, 1);
    for raw in [
        "Sat May 01 10:00:00 +0000 2021",
        "2021-05-01T10:00:00Z",
        "2021-05-01T10:00:00.123Z",
        "Sat, 01 May 2021 10:00:00 +0000",
        "2021-05-01T10:00:00",
        "2021-05-01 10:00:00",
        "2021-05-01 10:00",
        "2021-05-01",
        "2021/05/01",
        "5/1/2021",
        "May 1, 2021",
        "1 May 2021",
        "  2021-05-01  ",
        "1619863200",
        "1619863200000",
        "20210501",
        "20210501T100000Z",
        "20210501T233000-0500",
        "2021-05-01T10:00:00.123+0000",
    ] {
        assert_eq!(parse_created_at(raw), Ok(may1), "layout {raw:?}");
    }

    assert_eq!(parse_created_at("   "), Err(DateError::Empty));
    // short digit runs are not epochs
    assert!(matches!(parse_created_at("2021"), Err(DateError::Unrecognized { .. })));
    assert!(matches!(parse_created_at("20211301"), Err(DateError::Unrecognized { .. })));
    assert!(matches!(parse_created_at("2021-13-01"), Err(DateError::Unrecognized { .. })));
    assert!(matches!(parse_created_at("tomorrow"), Err(DateError::Unrecognized { .. })));
}

/// Days display and parse as `DD-MM-YYYY`; the flat listing uses ISO form.
#[test]
fn day_formats() {
    let d = day(2021, 5, 1);
    assert_eq!(d.to_string(), "01-05-2021");
    assert_eq!(d.iso(), "2021-05-01");
    assert_eq!("01-05-2021".parse::<Day>().unwrap(), d);
    assert!("2021-05-01".parse::<Day>().is_err());
    assert!(Day::new(2021, 2, 30).is_none());
    assert!(day(2021, 4, 30) < d);
}
