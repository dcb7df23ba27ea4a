use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vibe", about = "Music taste compatibility and recommendations")]
pub struct Cli {
    /// Suppress stderr output (log lines, status messages).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output results as JSON lines (NDJSON).
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to config.toml (defaults to the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the taste profile of a set of liked tracks.
    Profile {
        /// Catalog file (JSON array, NDJSON or CSV).
        #[arg(short, long)]
        catalog: PathBuf,

        /// Liked tracks, as catalog indices or track ids (comma separated).
        #[arg(short, long, value_delimiter = ',', required = true)]
        liked: Vec<String>,

        /// Show the profile in standardized units.
        #[arg(long)]
        normalized: bool,
    },

    /// Score how compatible two users' tastes are (0-100).
    Compat {
        /// Catalog file (JSON array, NDJSON or CSV).
        #[arg(short, long)]
        catalog: PathBuf,

        /// First user's liked tracks.
        #[arg(short = 'a', long = "user-a", value_delimiter = ',', required = true)]
        user_a: Vec<String>,

        /// Second user's liked tracks.
        #[arg(short = 'b', long = "user-b", value_delimiter = ',', required = true)]
        user_b: Vec<String>,

        /// Compare raw feature values instead of standardized ones.
        #[arg(long)]
        raw: bool,
    },

    /// Recommend catalog tracks closest to a taste profile.
    Recommend {
        /// Catalog file (JSON array, NDJSON or CSV).
        #[arg(short, long)]
        catalog: PathBuf,

        /// Liked tracks, as catalog indices or track ids (comma separated).
        #[arg(short, long, value_delimiter = ',', required = true)]
        liked: Vec<String>,

        /// Number of results (defaults to config `recommendations`).
        #[arg(short)]
        n: Option<usize>,

        /// Leave the liked tracks out of the results.
        #[arg(long)]
        exclude_liked: bool,
    },

    /// Group the catalog into taste clusters.
    Cluster {
        /// Catalog file (JSON array, NDJSON or CSV).
        #[arg(short, long)]
        catalog: PathBuf,

        /// Number of clusters.
        #[arg(short)]
        k: Option<usize>,

        /// Seed for centroid initialization.
        #[arg(long)]
        seed: Option<u64>,

        /// Iteration bound per run.
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Seeded runs to try; the tightest clustering wins.
        #[arg(long)]
        restarts: Option<usize>,

        /// Genres to list per cluster.
        #[arg(long, default_value = "2")]
        top_genres: usize,
    },

    /// Write a synthetic pop/rock/indie/electronic catalog as JSON.
    Sample {
        /// Tracks per genre.
        #[arg(long, default_value = "50")]
        per_genre: usize,

        /// Random seed.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
