use anyhow::{Context, Result, bail};
use std::{path::PathBuf, time::Duration};
use tilesmith_archive::{ArchiveMetadata, ArchiveType, MBTilesArchive};
use tilesmith_core::{GeoBBox, TileExtents};
use tilesmith_pipeline::{FeatureSource, PipelineConfig, PostProcessors, helpers::DebugSource, run_pipeline};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// the MBTiles file to create (an existing file is replaced)
	#[arg()]
	output_file: PathBuf,

	/// minimum zoom level
	#[arg(long, value_name = "int", default_value_t = 0, display_order = 1)]
	min_zoom: u8,

	/// maximum zoom level
	#[arg(long, value_name = "int", default_value_t = 4, display_order = 1)]
	max_zoom: u8,

	/// only generate tiles inside a bounding box
	#[arg(
		long,
		short,
		value_name = "lon_min,lat_min,lon_max,lat_max",
		allow_hyphen_values = true,
		display_order = 1
	)]
	bbox: Option<String>,

	/// number of encoder threads
	#[arg(long, value_name = "int", display_order = 2)]
	threads: Option<usize>,

	/// write tiles in completion order instead of strict tile order
	#[arg(long, display_order = 2)]
	unordered: bool,

	/// create the tile index after the bulk load instead of before it
	#[arg(long, display_order = 3)]
	defer_index: bool,

	/// vacuum and analyze the archive after the last write
	#[arg(long, display_order = 3)]
	optimize: bool,

	/// tag every feature with its tile coordinate, making all tiles unique
	#[arg(long, display_order = 4)]
	coordinate_tags: bool,

	/// value of the archive's name metadata entry
	#[arg(long, value_name = "string", default_value = "tilesmith debug tiles", display_order = 4)]
	name: String,

	/// seconds between progress log lines
	#[arg(long, value_name = "int", default_value_t = 10, display_order = 4)]
	log_interval: u64,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	log::info!("generating tiles into {:?}", arguments.output_file);

	let bounds = parse_bbox(arguments.bbox.as_deref())?;
	let extents = TileExtents::from_geo_bbox(arguments.min_zoom, arguments.max_zoom, &bounds)
		.context("Failed to compute the tile extents")?;

	let mut config = PipelineConfig {
		minzoom: arguments.min_zoom,
		maxzoom: arguments.max_zoom,
		emit_tiles_in_order: !arguments.unordered,
		defer_index_creation: arguments.defer_index,
		optimize_archive: arguments.optimize,
		log_interval: Duration::from_secs(arguments.log_interval.max(1)),
		extents: extents.clone(),
		..Default::default()
	};
	if let Some(threads) = arguments.threads {
		config.threads = threads;
	}

	let metadata = ArchiveMetadata::new(&arguments.name, bounds, arguments.min_zoom, arguments.max_zoom)
		.with_description("synthetic vector tiles for testing map pipelines")
		.with_attribution("tilesmith")
		.with_type(ArchiveType::Baselayer)
		.with_json(r#"{"vector_layers":[{"id":"background","fields":{"kind":"String"}}]}"#);

	let source = DebugSource::new(
		&[("background", &[&[("kind", "debug")][..]][..])],
		&extents,
		arguments.coordinate_tags,
	);
	log::info!(
		"{} tiles with {} features to generate",
		extents.count_tiles(),
		source.num_features()
	);
	let archive = MBTilesArchive::create(&arguments.output_file)?;

	let telemetry = run_pipeline(source, Box::new(archive), metadata, PostProcessors::new(), &config).await?;

	log::info!(
		"finished: {} tiles written, {} deduplicated",
		telemetry.tiles_written(),
		telemetry.memoized_tiles()
	);
	Ok(())
}

fn parse_bbox(bbox: Option<&str>) -> Result<GeoBBox> {
	let Some(bbox) = bbox else {
		return Ok(GeoBBox::new_full());
	};

	let values: Vec<f64> = bbox
		.split(&[' ', ',', ';'])
		.filter(|s| !s.is_empty())
		.map(|s| s.parse::<f64>().with_context(|| format!("bbox value {s:?} is not a number")))
		.collect::<Result<Vec<f64>>>()?;

	if values.len() != 4 {
		bail!("bbox must contain exactly 4 numbers, but got: {bbox:?}");
	}

	GeoBBox::try_from(values)
}
