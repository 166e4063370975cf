//! Headless page renderer: builds the widget against an in-memory page,
//! replays a few interactions and prints the resulting markup.

use anyhow::{bail, Context, Result};
use clap::Parser;
use mapnav::{
    AppEvent, LocationFix, ManualGeolocation, MapAppBuilder, MemoryDocument, Point,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// JSON configuration; the stock page when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Follow the sidebar link with this title (repeatable)
    #[arg(short, long)]
    select: Vec<String>,

    /// Click the map at container pixel X,Y (repeatable)
    #[arg(long, value_name = "X,Y", value_delimiter = ',', allow_negative_numbers = true)]
    click: Vec<f64>,

    /// Press the locate button and deliver the fix LAT,LNG,ACCURACY (repeatable)
    #[arg(long, value_name = "LAT,LNG,ACCURACY", value_delimiter = ',', allow_negative_numbers = true)]
    locate: Vec<f64>,

    /// Locate once on page load and answer with LAT,LNG,ACCURACY
    #[arg(long, value_name = "LAT,LNG,ACCURACY", value_delimiter = ',', allow_negative_numbers = true)]
    on_load: Vec<f64>,
}

/// Splits a flat `--flag a,b --flag c,d` list into tuples of `N`
fn tuples<const N: usize>(flag: &str, values: &[f64]) -> Result<Vec<[f64; N]>> {
    if values.len() % N != 0 {
        bail!("--{flag} takes {N} comma separated numbers per use");
    }
    Ok(values
        .chunks_exact(N)
        .map(|chunk| {
            let mut tuple = [0.0; N];
            tuple.copy_from_slice(chunk);
            tuple
        })
        .collect())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let clicks = tuples::<2>("click", &args.click)?;
    let fixes = tuples::<3>("locate", &args.locate)?;
    let on_load = tuples::<3>("on-load", &args.on_load)?;
    if on_load.len() > 1 {
        bail!("--on-load can only be given once");
    }

    let builder = match &args.config {
        Some(path) => MapAppBuilder::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => MapAppBuilder::new(),
    }
    .with_locate_on_load(!on_load.is_empty());

    let selectors = &builder.config().selectors;
    let page = MemoryDocument::with_elements(&[
        selectors.map_container.as_str(),
        selectors.routes.as_str(),
        selectors.marker_position.as_str(),
    ])?;
    let mut app = builder.build(page, ManualGeolocation::new())?;

    for [lat, lng, accuracy] in on_load {
        app.handle(AppEvent::LocationFound(LocationFix::new(lat, lng, accuracy)))?;
    }
    for title in &args.select {
        app.select_point(title)
            .with_context(|| format!("no point of interest titled '{title}'"))?;
    }
    for [x, y] in clicks {
        app.handle(AppEvent::MapClick { pixel: Point::new(x, y) })?;
    }
    if !fixes.is_empty() {
        app.handle(AppEvent::LocateButtonClick)?;
        for [lat, lng, accuracy] in fixes {
            app.handle(AppEvent::LocationFound(LocationFix::new(lat, lng, accuracy)))?;
        }
    }

    let viewport = app.map().viewport();
    log::info!(
        "view: {} at zoom {} ({} layers)",
        viewport.center,
        viewport.zoom,
        app.map().layer_count()
    );
    println!("{}", app.document().to_html());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_flags_group_into_tuples() {
        let args = CliArgs::parse_from([
            "mapnav-app",
            "--click",
            "10,20",
            "--click",
            "30,-5",
            "--locate",
            "-16.8,-179.99,5000",
        ]);
        assert_eq!(tuples::<2>("click", &args.click).unwrap(), vec![[10.0, 20.0], [30.0, -5.0]]);
        assert_eq!(tuples::<3>("locate", &args.locate).unwrap(), vec![[-16.8, -179.99, 5000.0]]);
        assert!(args.on_load.is_empty());
    }

    #[test]
    fn test_incomplete_tuple_is_rejected() {
        let args = CliArgs::parse_from(["mapnav-app", "--locate", "1,2"]);
        assert!(tuples::<3>("locate", &args.locate).is_err());
    }
}
