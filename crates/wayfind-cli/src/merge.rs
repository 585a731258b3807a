//! `merge` and `regions` command handlers. Neither calls the model.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use wayfind_core::{group_by_region, PlaceRecord, RegionGroup};
use wayfind_extract::merge_batches;

use crate::catalogue::{write_output, Catalogue};

/// Merge catalogue files in order; the first file's ids win.
///
/// # Errors
///
/// Returns an error if any file cannot be read or parsed, or the output
/// cannot be written.
pub(crate) fn run_merge(files: &[PathBuf], output: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut merged: Vec<PlaceRecord> = Vec::new();
    let mut summary = String::new();
    let mut total_in = 0usize;

    for path in files {
        let catalogue = Catalogue::load(path)?;
        total_in += catalogue.places.len();
        if summary.is_empty() {
            summary = catalogue.summary;
        }
        merged = merge_batches(merged, catalogue.places);
    }

    tracing::info!(
        files = files.len(),
        input_places = total_in,
        output_places = merged.len(),
        "merged catalogues"
    );

    let body = Catalogue::new(summary, merged).to_json()?;
    write_output(output.map(PathBuf::as_path), &body)
}

/// Print region and subregion counts for a catalogue.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub(crate) fn run_regions(file: &Path) -> anyhow::Result<()> {
    let catalogue = Catalogue::load(file)?;
    print!("{}", format_regions(&group_by_region(&catalogue.places)));
    Ok(())
}

pub(crate) fn format_regions(groups: &[RegionGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{} ({})", group.region, group.total);
        for (subregion, count) in &group.subregions {
            let _ = writeln!(out, "  {subregion} ({count})");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, location: &str) -> PlaceRecord {
        let mut r = PlaceRecord::new(id, format!("Place {id}"));
        r.location_guess = location.to_string();
        r
    }

    #[test]
    fn regions_are_listed_with_indented_subregions() {
        let places = vec![
            place("1", "Tokyo Shibuya"),
            place("2", "Osaka Namba"),
            place("3", "Tokyo Shibuya"),
            place("4", "Tokyo Ginza"),
            place("5", ""),
        ];
        let text = format_regions(&group_by_region(&places));
        assert_eq!(
            text,
            "Tokyo (3)\n  Shibuya (2)\n  Ginza (1)\nOsaka (1)\n  Namba (1)\nUnclassified (1)\n  Unclassified (1)\n"
        );
    }

    #[test]
    fn no_places_prints_nothing() {
        assert_eq!(format_regions(&[]), "");
    }
}
