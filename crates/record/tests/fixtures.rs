use std::fs;
use std::path::PathBuf;

use battag_record::*;
use pretty_assertions::assert_eq;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join("records").join(format!("{}.json", name));
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read fixture: {:?}", path))
}

#[test]
fn full_fixture_round_trips_byte_for_byte() {
    let raw = read_fixture("full");
    let record = BatteryRecord::parse(&raw).unwrap();

    assert_eq!(record.sn, "1234-007");
    assert_eq!(record.u.len(), MAX_USAGE_ENTRIES);
    assert_eq!(record.to_json().unwrap(), raw.trim_end());
    assert_eq!(BatteryRecord::parse(&record.to_json().unwrap()).unwrap(), record);
}

#[test]
fn full_fixture_summary() {
    let record = BatteryRecord::parse(&read_fixture("full")).unwrap();
    assert_eq!(
        record.summarize(),
        UsageStats {
            robot: 10,
            charger: 4,
            total: 14,
        }
    );
    assert_eq!(record.note(), NoteType::Practice);
    assert_eq!(record.last_device(), Some(DeviceType::Charger));
    assert_eq!(record.next_usage_id().unwrap(), 17);
}

#[test]
fn full_fixture_append_evicts_front() {
    let mut record = BatteryRecord::parse(&read_fixture("full")).unwrap();
    let before_cc = record.cc;

    record.append_usage_at(DeviceType::Robot, "2410151200").unwrap();

    assert_eq!(record.u.len(), MAX_USAGE_ENTRIES);
    assert_eq!(record.u.first().map(|e| e.i), Some(4));
    assert_eq!(record.u.last().map(|e| e.i), Some(17));
    assert_eq!(record.cc, before_cc);
}

#[test]
fn minimal_fixture_takes_defaults() {
    let record = BatteryRecord::parse(&read_fixture("minimal")).unwrap();
    assert_eq!(
        record,
        BatteryRecord {
            sn: "A0000".to_string(),
            fu: UNSET_TIMESTAMP.to_string(),
            cc: 0,
            n: 0,
            u: vec![],
        }
    );
}

#[test]
fn legacy_fixture_is_coerced() {
    let record = BatteryRecord::parse(&read_fixture("legacy")).unwrap();

    assert_eq!(record.sn, "4321");
    assert_eq!(record.fu, "0");
    assert_eq!(record.cc, 12);
    assert_eq!(record.n, 99);
    assert_eq!(record.note(), NoteType::Normal);
    assert_eq!(
        record.u,
        vec![
            UsageEntry {
                i: 1,
                t: "2403011200".to_string(),
                d: 1,
                e: 40,
                v: 13,
            },
            UsageEntry {
                i: 2,
                t: "2403021200".to_string(),
                d: 5,
                e: 0,
                v: 0,
            },
            UsageEntry {
                i: 3,
                t: UNSET_TIMESTAMP.to_string(),
                d: 2,
                e: 55,
                v: 12,
            },
        ]
    );
    assert_eq!(
        record.summarize(),
        UsageStats {
            robot: 1,
            charger: 1,
            total: 3,
        }
    );
}

#[test]
fn legacy_fixture_keeps_foreign_codes_on_rewrite() {
    let record = BatteryRecord::parse(&read_fixture("legacy")).unwrap();
    let again = BatteryRecord::parse(&record.to_json().unwrap()).unwrap();
    assert_eq!(again.n, 99);
    assert_eq!(again.u[1].d, 5);
    assert_eq!(again.u[1].device(), None);
}

#[test]
fn array_fixture_is_rejected() {
    let err = BatteryRecord::parse(&read_fixture("not_object")).unwrap_err();
    assert!(matches!(err, RecordError::NotAnObject(_)));
}

#[test]
fn new_battery_lifecycle() {
    let mut record = BatteryRecord::initialize("TEAM001");
    assert_eq!(record.cc, 0);
    assert!(record.u.is_empty());

    record.append_usage(DeviceType::Charger).unwrap();
    assert_eq!(record.cc, 1);
    assert_eq!(record.u.len(), 1);
    assert_eq!(record.u[0].i, 1);
    assert_eq!(record.u[0].d, 2);

    for _ in 0..14 {
        record.append_usage(DeviceType::Robot).unwrap();
    }

    let ids: Vec<u32> = record.u.iter().map(|e| e.i).collect();
    assert_eq!(ids, (2..=15).collect::<Vec<_>>());
    assert_eq!(record.cc, 1);
    assert!(record.u.iter().all(|e| e.i != 1));
    assert_eq!(record.sn, "TEAM001");
}

#[test]
fn note_changes_survive_serialization() {
    let mut record = BatteryRecord::initialize_at("S-1", "2409141230");
    record.set_note(NoteType::try_from(2).unwrap());

    let parsed = BatteryRecord::parse(&record.to_json().unwrap()).unwrap();
    assert_eq!(parsed.note(), NoteType::Scrap);
    assert_eq!(parsed, record);
}
