//! Offset estimation driver.
//!
//! Aligns a clip against a reference and prints the estimated offset as a
//! single JSON line on stdout.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use attune::{audio, Configuration, Fingerprint, FittingOptions};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let arguments: Vec<String> = std::env::args().skip(1).collect();
    let [clip_path, reference_path] = arguments.as_slice() else {
        bail!("usage: attune <clip> <reference>");
    };

    let configuration = Configuration::default();

    let clip = fingerprint(clip_path, &configuration)
        .with_context(|| format!("fingerprinting {clip_path}"))?;
    let reference = fingerprint(reference_path, &configuration)
        .with_context(|| format!("fingerprinting {reference_path}"))?;

    let alignment = clip.align(&reference, &FittingOptions::default())?;
    println!("{}", serde_json::to_string(&alignment)?);

    Ok(())
}

fn fingerprint(path: &str, configuration: &Configuration) -> Result<Fingerprint> {
    let samples = audio::load(Path::new(path), configuration.sample_rate)?;
    let fingerprint = Fingerprint::from_samples(&samples, *configuration)?;
    info!("{}: {} patterns", path, fingerprint.pattern_count());
    Ok(fingerprint)
}
