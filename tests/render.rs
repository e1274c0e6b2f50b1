use std::io::Write;

use fragtrack::filter::{ColorAttribute, FilterConfiguration};
use fragtrack::fragment::JsonFileSource;
use fragtrack::raster::rasterize;
use fragtrack::reference::ReferenceData;
use fragtrack::session::ViewSession;
use fragtrack::surface::{Layer, Shape};
use fragtrack::svg::render_svg;

const RECORDS: &str = r#"[
    {"Chromosome": "1", "Start": 1000000, "End": 3000000, "Haplotype": 0,
     "Individual_Phase": "HGDP00535_phased", "Ancestry": "Neanderthal", "Mean Post. Prob.": 0.92,
     "Population": "Papuan <Highlands>"},
    {"Chromosome": "1", "Start": 5000000, "End": 5600000, "Haplotype": 1,
     "Individual_Phase": "HGDP00535_phased", "Ancestry": "Denisova", "Mean Post. Prob.": 0.71},
    {"Chromosome": 2, "Start": 40000000, "End": 40200000, "Haplotype": 0,
     "Individual_Phase": "HGDP01149_unphased", "Ancestry": "Neanderthal", "Mean Post. Prob.": 0.48},
    {"Chromosome": "X", "Start": 100000000, "End": 100900000, "Haplotype": 0,
     "Individual_Phase": "HGDP01149_unphased", "Ancestry": "nonDAVC", "Mean Post. Prob.": 0.66}
]"#;

fn session(file: &tempfile::NamedTempFile, color_by: ColorAttribute) -> ViewSession<JsonFileSource> {
    let reference = ReferenceData::default();
    let mut config = FilterConfiguration::with_ancestries(reference.ancestries());
    config.individuals = vec!["HGDP00535_phased".to_string(), "HGDP01149_unphased".to_string()];
    config.color_by = color_by;
    ViewSession::new(JsonFileSource::new(file.path()), reference, config, (1200.0, 800.0))
}

fn records() -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(RECORDS.as_bytes())?;
    Ok(file)
}

#[test]
fn test_end_to_end_svg() -> Result<(), Box<dyn std::error::Error>> {
    let file = records()?;
    let mut session = session(&file, ColorAttribute::Ancestry);
    let summary = session.apply_filters().ok_or("fetch was discarded")?;

    assert_eq!(summary.tracks, 23);
    // the chromosome 2 fragment is below the confidence threshold
    assert_eq!(summary.fragments, 3);
    assert_eq!(summary.legend_entries, 3);

    let svg = render_svg(session.surface());
    assert!(svg.starts_with("<?xml"));
    assert_eq!(svg.matches(r#"class="fragment""#).count(), 3);
    assert!(svg.contains("Population: Papuan &lt;Highlands&gt;"));
    assert!(svg.contains(">Non-DAVC</text>"));
    assert!(svg.contains(r##"fill="#1b9e77""##));
    assert!(svg.contains(r#"width="890" height="780""#));

    let mut out = tempfile::Builder::new().suffix(".svg").tempfile()?;
    out.write_all(svg.as_bytes())?;
    assert!(std::fs::metadata(out.path())?.len() > 0);
    Ok(())
}

#[test]
fn test_end_to_end_png() -> Result<(), Box<dyn std::error::Error>> {
    let file = records()?;
    let mut session = session(&file, ColorAttribute::MeanPosteriorProbability);
    session.set_sidebar_visible(false);
    session.apply_filters();

    assert_eq!(session.surface().gradients.len(), 1);
    let image = rasterize(session.surface());
    assert_eq!(image.dimensions(), (1190, 780));

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("plot.png");
    image.save(&path)?;
    let reloaded = image::open(&path)?;
    assert_eq!((reloaded.width(), reloaded.height()), (1190, 780));
    Ok(())
}

#[test]
fn test_individual_colors_are_stable_across_sessions() -> Result<(), Box<dyn std::error::Error>> {
    let file = records()?;
    let fills = |session: &ViewSession<JsonFileSource>| -> Vec<String> {
        session
            .surface()
            .layer(Layer::Fragments)
            .filter_map(|e| match &e.shape {
                Shape::Rect { fill, .. } => Some(format!("{:?}", fill)),
                _ => None,
            })
            .collect()
    };

    let mut first = session(&file, ColorAttribute::Individual);
    first.apply_filters();
    let mut second = session(&file, ColorAttribute::Individual);
    second.resize(1600.0, 900.0);
    second.apply_filters();

    let (a, b) = (fills(&first), fills(&second));
    assert_eq!(a.len(), 3);
    assert_eq!(a, b);
    assert_eq!(a[0], a[1]);
    assert_ne!(a[0], a[2]);
    Ok(())
}

#[test]
fn test_missing_input_shows_placeholder() {
    let reference = ReferenceData::default();
    let config = FilterConfiguration::with_ancestries(reference.ancestries());
    let source = JsonFileSource::new("/nonexistent/fragments.json");
    let mut session = ViewSession::new(source, reference, config, (1200.0, 800.0));
    session.apply_filters();

    let svg = render_svg(session.surface());
    assert!(svg.contains("No data to display yet."));
    assert!(!svg.contains("<script>"));
}
