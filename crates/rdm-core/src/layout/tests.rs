use chrono::NaiveDate;
use std::path::Path;

use super::*;
use crate::lookups::{DetectionCoordinate, Detections, SpeciesTable};

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn lookups_with(id: &str, coord: DetectionCoordinate) -> Lookups {
    let mut detections = Detections::new();
    detections.insert(id.to_string(), vec![coord]);
    Lookups {
        detections,
        species: SpeciesTable::from_pairs([("7", "Turdus migratorius")]),
    }
}

fn classified(species: &str, songtype: &str, validated: &str) -> DetectionCoordinate {
    DetectionCoordinate {
        species_id: Some(species.into()),
        songtype_id: Some(songtype.into()),
        validated: Some(validated.into()),
        ..DetectionCoordinate::window(1.0, 2.0)
    }
}

#[test]
fn timestamped_filename() {
    let mut item = WorkItem::new("42", "https://h.example/a/b/clip.wav");
    item.timestamp = Some(ts(2024, 3, 14, 9, 5, 0));
    assert_eq!(file_name(&item), "20240314_090500-42.wav");
}

#[test]
fn no_timestamp_uses_bare_filename() {
    let item = WorkItem::new("42", "https://h.example/a/b/clip.wav");
    assert_eq!(file_name(&item), "clip.wav");
}

#[test]
fn timestamp_without_extension_uses_bare_filename() {
    let mut item = WorkItem::new("42", "https://h.example/a/b/clip");
    item.timestamp = Some(ts(2024, 3, 14, 9, 5, 0));
    assert_eq!(file_name(&item), "clip");
}

#[test]
fn default_dir_without_optional_fields() {
    let item = WorkItem::new("1", "https://h.example/clip.wav");
    let dest = resolve(&item, &Lookups::default(), Path::new("/out/recordings")).unwrap();
    assert_eq!(dest.dir, Path::new("/out/recordings"));
    assert_eq!(dest.path(), Path::new("/out/recordings/clip.wav"));
}

#[test]
fn site_subdirectory() {
    let mut item = WorkItem::new("1", "https://h.example/clip.wav");
    item.site_id = Some("site-12".into());
    let dest = resolve(&item, &Lookups::default(), Path::new("/out")).unwrap();
    assert_eq!(dest.dir, Path::new("/out/site-12"));
}

#[test]
fn species_chain_present() {
    let mut item = WorkItem::recording("42", "https://h.example/clip.wav");
    item.site_id = Some("s1".into());
    let lookups = lookups_with("42", classified("7", "2", "1"));
    let dest = resolve(&item, &lookups, Path::new("/out")).unwrap();
    assert_eq!(
        dest.dir,
        Path::new("/out/Turdus_migratorius_Common_Song/present/s1")
    );
}

#[test]
fn species_chain_absent_without_site() {
    let item = WorkItem::recording("42", "https://h.example/clip.wav");
    let lookups = lookups_with("42", classified("7", "4", "0"));
    let dest = resolve(&item, &lookups, Path::new("/out")).unwrap();
    assert_eq!(dest.dir, Path::new("/out/Turdus_migratorius_Alarm_Call/absent"));
}

#[test]
fn row_classification_used_when_no_detection() {
    let mut item = WorkItem::new("5", "https://h.example/clip.wav");
    item.species_id = Some("7".into());
    item.songtype_id = Some("1".into());
    item.validated = Some("1".into());
    let lookups = Lookups {
        detections: Detections::new(),
        species: SpeciesTable::from_pairs([("7", "Turdus migratorius")]),
    };
    let dest = resolve(&item, &lookups, Path::new("/out")).unwrap();
    assert_eq!(
        dest.dir,
        Path::new("/out/Turdus_migratorius_Simple_Call/present")
    );
}

#[test]
fn row_species_without_songtype_keeps_site_layout() {
    let mut item = WorkItem::new("5", "https://h.example/clip.wav");
    item.site_id = Some("s1".into());
    item.species_id = Some("7".into());
    let lookups = Lookups {
        detections: Detections::new(),
        species: SpeciesTable::from_pairs([("7", "Turdus migratorius")]),
    };
    let dest = resolve(&item, &lookups, Path::new("/out")).unwrap();
    assert_eq!(dest.dir, Path::new("/out/s1"));
}

#[test]
fn detections_ignored_for_non_recording_ids() {
    let mut item = WorkItem::new("42", "https://h.example/photo.jpg");
    item.site_id = Some("42".into());
    let lookups = lookups_with("42", classified("7", "2", "1"));
    let dest = resolve(&item, &lookups, Path::new("/out/sites")).unwrap();
    assert_eq!(dest.path(), Path::new("/out/sites/42/photo.jpg"));
}

#[test]
fn unknown_songtype_is_lookup_error() {
    let item = WorkItem::recording("42", "https://h.example/clip.wav");
    let lookups = lookups_with("42", classified("7", "99", "1"));
    let err = resolve(&item, &lookups, Path::new("/out")).unwrap_err();
    assert!(matches!(
        err,
        ItemError::Lookup { table: "songtype", ref code } if code == "99"
    ));
}

#[test]
fn unknown_species_is_lookup_error() {
    let item = WorkItem::recording("42", "https://h.example/clip.wav");
    let lookups = lookups_with("42", classified("8", "1", "1"));
    let err = resolve(&item, &lookups, Path::new("/out")).unwrap_err();
    assert!(matches!(err, ItemError::Lookup { table: "species", .. }));
}

#[test]
fn unclassified_detection_keeps_site_layout() {
    let mut item = WorkItem::recording("42", "https://h.example/clip.wav");
    item.site_id = Some("s1".into());
    let lookups = lookups_with("42", DetectionCoordinate::window(0.0, 1.0));
    let dest = resolve(&item, &lookups, Path::new("/out")).unwrap();
    assert_eq!(dest.dir, Path::new("/out/s1"));
}

#[test]
fn resolve_is_deterministic_across_threads() {
    let mut item = WorkItem::recording("42", "https://h.example/clip.flac");
    item.site_id = Some("s1".into());
    item.timestamp = Some(ts(2023, 1, 2, 3, 4, 5));
    let lookups = std::sync::Arc::new(lookups_with("42", classified("7", "6", "1")));
    let expected = resolve(&item, &lookups, Path::new("/out")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let item = item.clone();
            let lookups = std::sync::Arc::clone(&lookups);
            std::thread::spawn(move || resolve(&item, &lookups, Path::new("/out")).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn extension_and_base_name() {
    let d = DestinationPath {
        dir: "/o".into(),
        file_name: "20240314_090500-42.wav".into(),
    };
    assert_eq!(d.extension(), ".wav");
    assert_eq!(d.base_name(), "20240314_090500-42");

    let d = DestinationPath {
        dir: "/o".into(),
        file_name: "noext".into(),
    };
    assert_eq!(d.extension(), "");
    assert_eq!(d.base_name(), "noext");
}
