#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod cli;
mod report;
mod sample;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use report::{output_clusters, output_compatibility, output_profile, output_results};
use vibe_match::config::ClusteringSection;
use vibe_match::{
    Catalog, Config, TastePipeline, aggregate_profile, load_catalog, raw_compatibility,
};

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Profile {
            catalog,
            liked,
            normalized,
        } => cmd_profile(&config, &catalog, &liked, normalized, cli.json),
        Command::Compat {
            catalog,
            user_a,
            user_b,
            raw,
        } => cmd_compat(&config, &catalog, &user_a, &user_b, raw, cli.json),
        Command::Recommend {
            catalog,
            liked,
            n,
            exclude_liked,
        } => cmd_recommend(
            &config,
            &catalog,
            &liked,
            n.unwrap_or(config.recommendations),
            exclude_liked,
            cli.json,
        ),
        Command::Cluster {
            catalog,
            k,
            seed,
            max_iterations,
            restarts,
            top_genres,
        } => {
            let mut section = config.clustering;
            section.k = k.unwrap_or(section.k);
            section.seed = seed.unwrap_or(section.seed);
            section.max_iterations = max_iterations.unwrap_or(section.max_iterations);
            section.restarts = restarts.unwrap_or(section.restarts);
            cmd_cluster(&config, &catalog, section, top_genres, cli.json)
        }
        Command::Sample {
            per_genre,
            seed,
            output,
        } => cmd_sample(per_genre, seed, output.as_deref(), cli.quiet),
    }
}

fn open_catalog(config: &Config, path: &Path) -> Result<Catalog> {
    let schema = config.schema()?;
    load_catalog(path, &schema, config.drop_absent_features)
}

fn cmd_profile(
    config: &Config,
    path: &Path,
    liked: &[String],
    normalized: bool,
    json: bool,
) -> Result<i32> {
    let catalog = open_catalog(config, path)?;
    let liked = catalog.resolve_all(liked)?;

    if normalized {
        let pipeline = TastePipeline::fit(&catalog, config.degenerate_policy)?;
        let vector = pipeline.normalized_profile(&liked)?;
        output_profile("Normalized taste", &vector, liked.len(), catalog.schema(), json);
    } else {
        let profile = aggregate_profile(catalog.schema(), &catalog.select(&liked)?)?;
        output_profile(
            "Taste profile",
            profile.vector(),
            profile.track_count(),
            catalog.schema(),
            json,
        );
    }
    Ok(0)
}

fn cmd_compat(
    config: &Config,
    path: &Path,
    user_a: &[String],
    user_b: &[String],
    raw: bool,
    json: bool,
) -> Result<i32> {
    let catalog = open_catalog(config, path)?;
    let liked_a = catalog.resolve_all(user_a).context("resolving user A")?;
    let liked_b = catalog.resolve_all(user_b).context("resolving user B")?;

    let report = if raw {
        raw_compatibility(&catalog, &liked_a, &liked_b)?
    } else {
        TastePipeline::fit(&catalog, config.degenerate_policy)?
            .compatibility(&liked_a, &liked_b)?
    };
    output_compatibility(&report, catalog.schema(), json);
    Ok(0)
}

fn cmd_recommend(
    config: &Config,
    path: &Path,
    liked: &[String],
    n: usize,
    exclude_liked: bool,
    json: bool,
) -> Result<i32> {
    let catalog = open_catalog(config, path)?;
    let liked = catalog.resolve_all(liked)?;
    let pipeline = TastePipeline::fit(&catalog, config.degenerate_policy)?;

    let results = pipeline.recommend(&liked, n, exclude_liked)?;
    if results.is_empty() {
        return Ok(2);
    }
    output_results(&results, json);
    Ok(0)
}

fn cmd_cluster(
    config: &Config,
    path: &Path,
    section: ClusteringSection,
    top_genres: usize,
    json: bool,
) -> Result<i32> {
    let catalog = open_catalog(config, path)?;
    let pipeline = TastePipeline::fit(&catalog, config.degenerate_policy)?;

    let clustering = pipeline.cluster(section.k, section.seed, &section.engine_config())?;
    let summaries = clustering.summarize(&catalog, top_genres)?;
    output_clusters(&clustering, &summaries, json);
    Ok(0)
}

fn cmd_sample(per_genre: usize, seed: u64, output: Option<&Path>, quiet: bool) -> Result<i32> {
    if per_genre == 0 {
        eprintln!("--per-genre must be at least 1");
        return Ok(1);
    }
    let records = sample::generate(per_genre, seed);
    let text = serde_json::to_string_pretty(&records)?;

    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            if !quiet {
                eprintln!("Wrote {} tracks to {}", records.len(), path.display());
            }
        }
        None => println!("{text}"),
    }
    Ok(0)
}
