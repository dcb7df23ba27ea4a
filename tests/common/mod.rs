#![allow(dead_code)]

use std::collections::BTreeMap;

use vibe_match::{Catalog, FeatureSchema, TrackRecord};

pub const FEATURES: [&str; 5] = [
    "energy",
    "danceability",
    "valence",
    "acousticness",
    "instrumentalness",
];

/// Energetic, happy dance tracks.
pub const PARTY_A: [[f64; 5]; 5] = [
    [0.8, 0.9, 0.7, 0.1, 0.0],
    [0.9, 0.8, 0.8, 0.2, 0.1],
    [0.7, 0.85, 0.6, 0.15, 0.0],
    [0.85, 0.75, 0.9, 0.1, 0.0],
    [0.75, 0.95, 0.7, 0.05, 0.1],
];

/// A second party listener, close to `PARTY_A`.
pub const PARTY_B: [[f64; 5]; 5] = [
    [0.85, 0.8, 0.75, 0.15, 0.0],
    [0.9, 0.85, 0.7, 0.1, 0.0],
    [0.75, 0.9, 0.65, 0.2, 0.1],
    [0.8, 0.7, 0.8, 0.1, 0.0],
    [0.7, 0.88, 0.75, 0.1, 0.05],
];

/// Quiet, sad acoustic tracks.
pub const ACOUSTIC: [[f64; 5]; 5] = [
    [0.2, 0.3, 0.2, 0.9, 0.3],
    [0.15, 0.25, 0.1, 0.95, 0.4],
    [0.3, 0.4, 0.25, 0.85, 0.2],
    [0.25, 0.35, 0.15, 0.9, 0.35],
    [0.1, 0.2, 0.3, 0.92, 0.5],
];

pub const USER_A: [usize; 5] = [0, 1, 2, 3, 4];
pub const USER_B: [usize; 5] = [5, 6, 7, 8, 9];
pub const USER_C: [usize; 5] = [10, 11, 12, 13, 14];

pub fn schema() -> FeatureSchema {
    FeatureSchema::new(FEATURES).unwrap()
}

pub fn record(id: &str, genre: &str, values: &[f64; 5]) -> TrackRecord {
    let fields: BTreeMap<String, serde_json::Value> = FEATURES
        .iter()
        .zip(values)
        .map(|(name, v)| ((*name).to_string(), serde_json::json!(v)))
        .collect();
    TrackRecord {
        id: Some(id.to_string()),
        name: format!("Song {id}"),
        artist: format!("Artist {id}"),
        genre: genre.to_string(),
        fields,
    }
}

/// Fifteen tracks: user A's, then user B's, then user C's liked songs.
pub fn records() -> Vec<TrackRecord> {
    let groups = [
        ("a", "dance", &PARTY_A),
        ("b", "dance", &PARTY_B),
        ("c", "acoustic", &ACOUSTIC),
    ];
    groups
        .iter()
        .flat_map(|(user, genre, rows)| {
            rows.iter()
                .enumerate()
                .map(move |(i, values)| record(&format!("{user}{i}"), genre, values))
        })
        .collect()
}

pub fn catalog() -> Catalog {
    Catalog::from_records(schema(), records()).unwrap()
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} +/- {tol}, got {actual}"
    );
}
