use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use fragtrack::filter::{ColorAttribute, FilterConfiguration, WindowKb};
use fragtrack::fragment::{load_individuals, JsonFileSource};
use fragtrack::reference::{load_ancestry_colors, ReferenceData};
use fragtrack::session::ViewSession;

#[derive(Parser)]
#[command(name = "fragtrack")]
#[command(about = "Draw ancestry fragments on per-chromosome tracks.", long_about = None)]
struct Args {
    // MANDATORY OPTIONS
    /// Load fragment records (a JSON array) from this FILE.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Write the visualization to this FILE (PNG or SVG based on extension).
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: PathBuf,

    // Viewport Options
    /// Set the viewport width in pixels.
    #[arg(short = 'x', long = "width", value_name = "N", default_value_t = 1200)]
    width: u32,

    /// Set the viewport height in pixels.
    #[arg(short = 'y', long = "height", value_name = "N", default_value_t = 800)]
    height: u32,

    /// Give the whole viewport to the plot instead of sharing it with the filter sidebar.
    #[arg(long = "hide-sidebar")]
    hide_sidebar: bool,

    // Fragment Selection Options
    /// Comma-separated individual/phase identifiers to fetch (default: all in the input).
    #[arg(long = "individuals", value_name = "LIST", value_delimiter = ',', conflicts_with = "individuals_file")]
    individuals: Option<Vec<String>>,

    /// Read the individual/phase identifiers to fetch from FILE, one per line.
    #[arg(long = "individuals-file", value_name = "FILE")]
    individuals_file: Option<PathBuf>,

    /// Comma-separated chromosomes to draw (default: 1-22 and X).
    #[arg(short = 'c', long = "chromosomes", value_name = "LIST", value_delimiter = ',')]
    chromosomes: Option<Vec<String>>,

    /// Comma-separated ancestries to draw; an empty string selects none (default: all known).
    #[arg(short = 'a', long = "ancestries", value_name = "LIST")]
    ancestries: Option<String>,

    /// Minimum mean posterior probability.
    #[arg(short = 'm', long = "min-confidence", value_name = "FLOAT", default_value_t = 0.5)]
    min_confidence: f64,

    /// Minimum fragment length in kilobases.
    #[arg(short = 'l', long = "min-length", value_name = "KB", default_value_t = 50)]
    min_length: u64,

    /// Genomic window in kilobases: START-END.
    #[arg(short = 'w', long = "window", value_name = "START-END", default_value = "0-250000")]
    window: WindowKb,

    // Color Options
    /// Color by "Ancestry", "Individual" or "Mean Posterior Probability".
    #[arg(short = 'C', long = "color-by", value_name = "ATTRIBUTE", default_value = "Ancestry")]
    color_by: ColorAttribute,

    /// Read ancestry colors from FILE (label<TAB>#rrggbb or r,g,b per line).
    #[arg(long = "ancestry-colors", value_name = "FILE")]
    ancestry_colors: Option<PathBuf>,

    // General Options
    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 0)]
    verbose: u8,
}

fn build_config(args: &Args, reference: &ReferenceData, source: &JsonFileSource) -> FilterConfiguration {
    let mut config = FilterConfiguration::with_ancestries(reference.ancestries());

    config.individuals = if let Some(ref individuals) = args.individuals {
        individuals.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    } else if let Some(ref path) = args.individuals_file {
        match load_individuals(path) {
            Ok(individuals) => individuals,
            Err(e) => {
                eprintln!("Error loading individuals file: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match source.individuals() {
            Ok(individuals) => individuals,
            Err(e) => {
                eprintln!("Error loading fragments: {}", e);
                std::process::exit(1);
            }
        }
    };

    if let Some(ref chromosomes) = args.chromosomes {
        config.chromosomes = chromosomes.iter().map(|s| s.trim().to_string()).collect();
    }
    if let Some(ref ancestries) = args.ancestries {
        config.ancestries = ancestries
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    config.min_confidence = args.min_confidence;
    config.min_length_kb = args.min_length;
    config.window = args.window;
    config.color_by = args.color_by.clone();
    config
}

fn main() {
    let args = Args::parse();

    // Initialize logger based on verbosity
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    info!("Starting visualization...");

    let mut reference = ReferenceData::default();
    if let Some(ref path) = args.ancestry_colors {
        match load_ancestry_colors(path) {
            Ok(colors) => reference = reference.with_ancestry_colors(colors),
            Err(e) => {
                eprintln!("Error loading ancestry colors: {}", e);
                std::process::exit(1);
            }
        }
    }

    let source = JsonFileSource::new(&args.input);
    let config = build_config(&args, &reference, &source);
    if config.individuals.is_empty() {
        warn!("No individuals selected");
    }

    let mut session = ViewSession::new(source, reference, config, (args.width as f64, args.height as f64));
    if args.hide_sidebar {
        session.set_sidebar_visible(false);
    }
    let summary = session.apply_filters();
    if session.fragments().is_empty() {
        eprintln!("Warning: No fragments found for the selected individuals.");
    }
    if let Some(summary) = summary {
        info!(
            "{} tracks, {} fragments, {} legend entries",
            summary.tracks, summary.fragments, summary.legend_entries
        );
    }

    // Detect output format by file extension
    let is_svg = args.out.extension()
        .map(|ext| ext.to_ascii_lowercase() == "svg")
        .unwrap_or(false);

    info!("Saving to {:?}...", args.out);

    if is_svg {
        let svg_content = fragtrack::svg::render_svg(session.surface());

        let mut file = match File::create(&args.out) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error creating file: {}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = file.write_all(svg_content.as_bytes()) {
            eprintln!("Error writing SVG: {}", e);
            std::process::exit(1);
        }
    } else {
        let img = fragtrack::raster::rasterize(session.surface());

        if let Err(e) = img.save(&args.out) {
            eprintln!("Error saving image: {}", e);
            std::process::exit(1);
        }
    }

    info!("Done.");
}
