//! Headless space viewer.
//!
//! Exercises the full viewer flow without a renderer: loads a basemap scene,
//! optionally fetches a space's statistics and metadata, and runs the
//! viewport statistics reducer over features supplied from a local JSON
//! file (standing in for the engine's viewport query).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use catalog::SpaceClient;
use foundation::parse_view_fragment;
use scene::{Feature, PropertyPath};
use viewer::{BasemapRef, RecordingEngine, Viewer};

#[derive(Debug, Parser)]
#[command(name = "spaceview", about = "Headless geodata space viewer")]
struct Args {
    /// Space id to load statistics and metadata for.
    #[arg(long)]
    space: Option<String>,

    /// Access token passed through to the space service.
    #[arg(long)]
    token: Option<String>,

    /// Basemap name (or legacy numeric index) to load.
    #[arg(long)]
    basemap: Option<String>,

    /// Property path to summarize, in dotted notation (e.g. details.pop[0]).
    #[arg(long)]
    property: Option<String>,

    /// Start view as a zoom/lat/lng fragment, e.g. 5/50.5/-122.25.
    #[arg(long)]
    view: Option<String>,

    /// JSON file with an array of feature property bags, used as the
    /// simulated viewport.
    #[arg(long)]
    features: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let features = match &args.features {
        Some(path) => load_features(path)?,
        None => Vec::new(),
    };

    let engine = RecordingEngine::with_viewport(features);
    let mut viewer = Viewer::new(engine, SpaceClient::from_env());

    match &args.basemap {
        Some(name) => viewer.select_basemap(basemap_ref(name))?,
        None => viewer.load_initial_basemap()?,
    }
    viewer.on_scene_loaded();
    println!("basemap: {}", viewer.state().basemap);

    if let Some(property) = &args.property {
        viewer.state_mut().property_path = Some(PropertyPath::parse(property));
    }

    if let (Some(space), Some(token)) = (&args.space, &args.token) {
        let start = args.view.as_deref().and_then(parse_view_fragment);
        viewer.load_space(space, token, start).await?;
        print_space_panel(&viewer);
    }

    viewer.on_view_complete();
    print_viewport(&viewer);

    Ok(())
}

fn basemap_ref(name: &str) -> BasemapRef<'_> {
    match name.parse::<usize>() {
        Ok(index) => BasemapRef::ByLegacyIndex(index),
        Err(_) => BasemapRef::ByName(name),
    }
}

fn load_features(path: &PathBuf) -> Result<Vec<Feature>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(values
        .into_iter()
        .map(|v| {
            // Accept either bare property bags or GeoJSON-style features.
            match v.get("properties") {
                Some(props) => Feature::from_json(props.clone()),
                None => Feature::from_json(v),
            }
        })
        .collect())
}

fn print_space_panel(viewer: &Viewer<RecordingEngine>) {
    let Some(panel) = &viewer.state().space else {
        return;
    };
    println!("space: {}", panel.title);
    if !panel.description.is_empty() {
        println!("  {}", panel.description);
    }
    println!("  features: {}  size: {}", panel.feature_count, panel.data_size);
    if !viewer.state().unique_tags.is_empty() {
        let tags: Vec<&str> = viewer
            .state()
            .unique_tags
            .iter()
            .map(String::as_str)
            .collect();
        println!("  tags: {}", tags.join(", "));
    }
}

fn print_viewport(viewer: &Viewer<RecordingEngine>) {
    let summary = &viewer.state().viewport;
    println!("viewport features: {}", summary.feature_count);

    if !summary.tag_counts.is_empty() {
        println!("tag counts:");
        for (tag, count) in &summary.tag_counts {
            println!("  {tag}: {count}");
        }
    }

    let Some(property) = &summary.property else {
        return;
    };
    println!("distinct values: {}", property.distinct_count);
    for (value, count) in property.value_counts.iter().take(10) {
        println!("  {value}: {count}");
    }

    if let Some(numeric) = &property.numeric {
        println!(
            "min {} / max {} / mean {:.3} / median {} / stddev {:.3}",
            numeric.min, numeric.max, numeric.mean, numeric.median, numeric.std_dev
        );
        println!(
            "sigma band ({:.3}, {:.3}): {} inside, {} outside",
            numeric.sigma.floor, numeric.sigma.ceiling, numeric.sigma.count, numeric.sigma.outside
        );
    }
}
