use std::collections::BTreeMap;

use serde::Serialize;

use vibe_match::cluster::ClusterSummary;
use vibe_match::{Clustering, CompatibilityReport, FeatureSchema, FeatureVector, ScoredTrack};

const BAR_WIDTH: f64 = 20.0;

/// Horizontal bar for a value on the 0-1 scale; out-of-range values are clamped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar(value: f64) -> String {
    "█".repeat((value.clamp(0.0, 1.0) * BAR_WIDTH) as usize)
}

fn named(vector: &FeatureVector, schema: &FeatureSchema) -> BTreeMap<String, f64> {
    schema.names().iter().cloned().zip(vector.iter()).collect()
}

fn print_json<T: Serialize>(value: &T) {
    if let Ok(j) = serde_json::to_string(value) {
        println!("{j}");
    }
}

pub fn output_profile(
    title: &str,
    vector: &FeatureVector,
    track_count: usize,
    schema: &FeatureSchema,
    json: bool,
) {
    if json {
        print_json(&serde_json::json!({
            "user": title,
            "track_count": track_count,
            "features": named(vector, schema),
        }));
        return;
    }
    println!("{title} ({track_count} tracks)");
    for (name, value) in schema.names().iter().zip(vector.iter()) {
        println!("   {name:18} {:20} {value:.3}", bar(value));
    }
}

pub fn output_compatibility(report: &CompatibilityReport, schema: &FeatureSchema, json: bool) {
    let c = &report.compatibility;
    if json {
        print_json(&serde_json::json!({
            "cosine": c.cosine,
            "score": c.score,
            "verdict": c.verdict,
            "normalized": report.normalized,
            "profile_a": named(report.profile_a.vector(), schema),
            "profile_b": named(report.profile_b.vector(), schema),
        }));
        return;
    }
    println!("Cosine similarity:   {:.3}", c.cosine);
    println!("Compatibility score: {:.1}%", c.score);
    println!("Status:              {}", c.verdict.label());
    for (title, profile) in [("User A", &report.profile_a), ("User B", &report.profile_b)] {
        println!();
        output_profile(title, profile.vector(), profile.track_count(), schema, false);
    }
}

pub fn output_results(results: &[ScoredTrack], json: bool) {
    for r in results {
        if json {
            print_json(r);
        } else {
            println!("{}", r.to_tsv());
        }
    }
}

pub fn output_clusters(clustering: &Clustering, summaries: &[ClusterSummary], json: bool) {
    if json {
        for s in summaries {
            print_json(s);
        }
        return;
    }
    for s in summaries {
        let genres = s
            .top_genres
            .iter()
            .map(|(g, n)| format!("{g} ({n})"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Cluster {}: {} songs", s.cluster, s.size);
        if !genres.is_empty() {
            println!("   Main genres: {genres}");
        }
    }
    eprintln!(
        "\n{} iterations, {}, inertia {:.3}, seed {}",
        clustering.iterations,
        if clustering.converged { "converged" } else { "not converged" },
        clustering.inertia,
        clustering.seed,
    );
}
