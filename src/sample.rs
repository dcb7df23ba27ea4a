use std::collections::BTreeMap;
use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use vibe_match::TrackRecord;

struct GenreStyle {
    genre: &'static str,
    song: &'static str,
    artist: &'static str,
    popularity: Range<i64>,
    danceability: Range<f64>,
    energy: Range<f64>,
    valence: Range<f64>,
    acousticness: Range<f64>,
    instrumentalness: Range<f64>,
    tempo: Range<f64>,
}

const STYLES: [GenreStyle; 4] = [
    GenreStyle {
        genre: "pop",
        song: "Pop Song",
        artist: "Pop Artist",
        popularity: 60..100,
        danceability: 0.6..0.9,
        energy: 0.5..0.8,
        valence: 0.5..0.9,
        acousticness: 0.1..0.4,
        instrumentalness: 0.0..0.1,
        tempo: 100.0..130.0,
    },
    GenreStyle {
        genre: "rock",
        song: "Rock Song",
        artist: "Rock Artist",
        popularity: 40..80,
        danceability: 0.3..0.6,
        energy: 0.7..1.0,
        valence: 0.3..0.7,
        acousticness: 0.1..0.3,
        instrumentalness: 0.0..0.3,
        tempo: 110.0..150.0,
    },
    GenreStyle {
        genre: "indie",
        song: "Indie Song",
        artist: "Indie Artist",
        popularity: 20..60,
        danceability: 0.3..0.6,
        energy: 0.2..0.5,
        valence: 0.2..0.6,
        acousticness: 0.6..0.95,
        instrumentalness: 0.0..0.2,
        tempo: 80.0..120.0,
    },
    GenreStyle {
        genre: "electronic",
        song: "EDM Song",
        artist: "DJ Artist",
        popularity: 50..90,
        danceability: 0.7..0.95,
        energy: 0.8..1.0,
        valence: 0.4..0.8,
        acousticness: 0.0..0.1,
        instrumentalness: 0.3..0.9,
        tempo: 120.0..150.0,
    },
];

/// Synthetic catalog: `per_genre` tracks of each style, genre blocks in order.
pub fn generate(per_genre: usize, seed: u64) -> Vec<TrackRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(per_genre * STYLES.len());

    for style in &STYLES {
        for i in 0..per_genre {
            let mut fields = BTreeMap::new();
            fields.insert(
                "popularity".to_string(),
                json!(rng.random_range(style.popularity.clone())),
            );
            for (name, range) in [
                ("danceability", &style.danceability),
                ("energy", &style.energy),
                ("valence", &style.valence),
                ("acousticness", &style.acousticness),
                ("instrumentalness", &style.instrumentalness),
                ("tempo", &style.tempo),
            ] {
                fields.insert(name.to_string(), json!(rng.random_range(range.clone())));
            }
            records.push(TrackRecord {
                id: Some(format!("{}-{:03}", style.genre, i + 1)),
                name: format!("{} {}", style.song, i + 1),
                artist: format!("{} {}", style.artist, i % 10),
                genre: style.genre.to_string(),
                fields,
            });
        }
    }
    records
}
