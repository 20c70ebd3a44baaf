use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;

use crate::pipeline::dataset::{self, BackupPolicy};
use crate::pipeline::error::Error;
use crate::pipeline::geo_util;
use crate::trips::convert::{convert_trips, ConversionStats};

/// The three ways of building the map dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Append the new trips to the existing dataset
    Merge,
    /// Same as `Merge`, reported as the old trips plus jacques' trips
    MergeAnciens,
    /// Rebuild the dataset from the elia and jacques exports, without duplicates
    Fusion,
}

impl Variant {
    fn dedup(&self) -> bool {
        matches!(self, Variant::Fusion)
    }

    fn backup_policy(&self) -> BackupPolicy {
        match self {
            Variant::Merge | Variant::MergeAnciens => BackupPolicy::Required,
            Variant::Fusion => BackupPolicy::IfPresent,
        }
    }
}

/// Files read and written by a merge run.
#[derive(Debug, Clone)]
pub struct MergePaths {
    pub output: PathBuf,
    pub backup: PathBuf,
    pub stations: PathBuf,
    pub new_trips: PathBuf,
    pub elia_trips: PathBuf,
}

impl MergePaths {
    /// Default file layout inside a data directory.
    pub fn in_dir(dir: &Path) -> MergePaths {
        let output = dir.join("velov-trips.json");
        MergePaths {
            backup: dataset::default_backup_path(&output),
            output,
            stations: dir.join("metropole-de-lyon_pvo_patrimoine_voirie.pvostationvelov.json"),
            new_trips: dir.join("velovs-trips-jacques.json"),
            elia_trips: dir.join("velovs-trips-elia.json"),
        }
    }
}

/// Outcome of a merge run.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub variant: Variant,
    /// Records kept from the existing dataset
    pub base: usize,
    /// Records in the written dataset
    pub total: usize,
    pub stats: ConversionStats,
    /// Whether the previous output was copied to the backup path
    pub backed_up: bool,
    /// Summed straight-line length of the converted trips
    pub distance_km: f64,
}

impl MergeReport {
    pub fn print_stats(&self) {
        let ConversionStats {
            converted,
            ignored,
            duplicates,
        } = self.stats;
        match self.variant {
            Variant::Merge => {
                println!("Merge complete: {} trips.", self.total);
                println!("New trips converted: {}", converted);
                if ignored > 0 {
                    log::warn!("{} trips ignored (stations not found)", ignored);
                }
            }
            Variant::MergeAnciens => {
                println!("Merge complete: {} trips (old + jacques).", self.total);
                println!("Jacques trips converted: {}, ignored: {}", converted, ignored);
            }
            Variant::Fusion => {
                println!("Merge complete: {} trips mapped.", self.total);
                println!("Trips converted: {}, ignored: {}", converted, ignored);
                if duplicates > 0 {
                    println!("Duplicate trips skipped: {}", duplicates);
                }
            }
        }
        println!("Distance covered by converted trips: {:.1} km", self.distance_km);
    }
}

/// Run one merge variant end to end: load, convert, back up, write.
pub fn run(variant: Variant, paths: &MergePaths) -> Result<MergeReport, Error> {
    let start = Instant::now();

    let (base, raw_trips) = match variant {
        Variant::Merge | Variant::MergeAnciens => {
            let base = dataset::load_records(&paths.output)?;
            log::debug!("Loaded {} existing trips from {}", base.len(), paths.output.display());
            (base, dataset::load_raw_trips(&paths.new_trips)?)
        }
        Variant::Fusion => {
            let mut raw_trips = dataset::load_raw_trips(&paths.elia_trips)?;
            raw_trips.extend(dataset::load_raw_trips(&paths.new_trips)?);
            (Vec::new(), raw_trips)
        }
    };
    log::debug!("Loaded {} raw trips", raw_trips.len());

    let stations_start = Instant::now();
    let stations = dataset::load_stations(&paths.stations)?;
    log::debug!(
        "Indexed {} stations from {} features in {}ms",
        stations.len(),
        stations.feature_count(),
        stations_start.elapsed().as_millis()
    );

    let (converted, stats) = convert_trips(raw_trips, &stations, variant.dedup());
    let distance_km = geo_util::total_length_km(&converted);

    let base_count = base.len();
    let mut records: Vec<Value> = base;
    records.reserve(converted.len());
    for trip in &converted {
        records.push(serde_json::to_value(trip)?);
    }

    let backed_up = dataset::backup(&paths.output, &paths.backup, variant.backup_policy())?;
    if backed_up {
        log::debug!("Backed up previous output to {}", paths.backup.display());
    }
    dataset::write_pretty(&paths.output, &records)?;
    log::debug!(
        "Wrote {} trips to {} in {}ms",
        records.len(),
        paths.output.display(),
        start.elapsed().as_millis()
    );

    Ok(MergeReport {
        variant,
        base: base_count,
        total: records.len(),
        stats,
        backed_up,
        distance_km,
    })
}
