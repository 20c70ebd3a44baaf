use std::error::Error as _;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use velov_trips::pipeline::dataset;
use velov_trips::pipeline::error::Error;
use velov_trips::pipeline::merge::{self, MergePaths, Variant};
use velov_trips::trips::geojson;

#[derive(Parser, Debug)]
#[command(author, version, about = "Merge Vélo'v trip exports into the map dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append jacques' new trips to the existing dataset
    Merge(MergeArgs),
    /// Append jacques' trips to the old dataset, reported as old + jacques
    MergeAnciens(MergeArgs),
    /// Rebuild the dataset from the elia and jacques exports, skipping duplicate ids
    Fusion(MergeArgs),
    /// Write a merged dataset as a GeoJSON FeatureCollection
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct MergeArgs {
    #[arg(long, default_value = "public")]
    data_dir: PathBuf,

    /// Dataset to update [default: <data-dir>/velov-trips.json]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Copy of the previous dataset [default: <output> as .old.json]
    #[arg(long)]
    backup: Option<PathBuf>,

    /// Station layer GeoJSON
    #[arg(long)]
    stations: Option<PathBuf>,

    /// Raw trips to add [default: <data-dir>/velovs-trips-jacques.json]
    #[arg(long)]
    new_trips: Option<PathBuf>,

    /// Raw trips read first by `fusion` [default: <data-dir>/velovs-trips-elia.json]
    #[arg(long)]
    elia_trips: Option<PathBuf>,
}

impl MergeArgs {
    fn into_paths(self) -> MergePaths {
        let mut paths = MergePaths::in_dir(&self.data_dir);
        if let Some(output) = self.output {
            paths.backup = dataset::default_backup_path(&output);
            paths.output = output;
        }
        if let Some(backup) = self.backup {
            paths.backup = backup;
        }
        if let Some(stations) = self.stations {
            paths.stations = stations;
        }
        if let Some(new_trips) = self.new_trips {
            paths.new_trips = new_trips;
        }
        if let Some(elia_trips) = self.elia_trips {
            paths.elia_trips = elia_trips;
        }
        paths
    }
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, default_value = "public/velov-trips.json")]
    input: PathBuf,

    #[arg(long, default_value = "public/velov-trips.geojson")]
    output: PathBuf,
}

fn run_merge(variant: Variant, args: MergeArgs) -> Result<(), Error> {
    let paths = args.into_paths();
    log::debug!("Merging with {:?}", paths);
    let report = merge::run(variant, &paths)?;
    report.print_stats();
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), Error> {
    let records = dataset::load_records(&args.input)?;
    let (features, skipped) = geojson::dataset_features(&records);
    dataset::write_pretty(&args.output, &geojson::convert_to_geojson(&features))?;
    println!("Exported {} trips to {}", features.len(), args.output.display());
    if skipped > 0 {
        log::warn!("{} records skipped (not in map trip format)", skipped);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Merge(args) => run_merge(Variant::Merge, args),
        Command::MergeAnciens(args) => run_merge(Variant::MergeAnciens, args),
        Command::Fusion(args) => run_merge(Variant::Fusion, args),
        Command::Export(args) => run_export(args),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            log::error!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}
