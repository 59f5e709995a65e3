use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use overmap_atlas::export::{
    export_geometry, export_images, export_sqlite, export_text, write_manifest, LayerSelection,
    PostgisSink, RunManifest,
};
use overmap_atlas::gamedata::load_template_store;
use overmap_atlas::{build_world, CellMetrics, PyramidConfig, RenderConfig, SaveData};

#[derive(Parser, Debug)]
#[command(name = "overmap_atlas")]
#[command(about = "Render overmap saves as text, images, tile pyramids and PostGIS rows")]
struct Args {
    /// Game install root (the directory holding data/json)
    #[arg(short, long)]
    game: PathBuf,

    /// Save directory to render
    #[arg(short, long)]
    save: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Write text layers
    #[arg(long)]
    text: bool,

    /// Write one PNG per layer
    #[arg(long)]
    images: bool,

    /// Write tile pyramids
    #[arg(long)]
    tiles: bool,

    /// Keep tiles that already exist on disk
    #[arg(long)]
    resume: bool,

    /// Keep the logical canvas at the map size instead of rounding it up to whole tiles
    #[arg(long)]
    no_pad: bool,

    /// Vertical layer to export, 0-20 (repeatable, default all)
    #[arg(short, long = "layer")]
    layers: Vec<usize>,

    /// Export terrain layers (the default when no kind is given)
    #[arg(long)]
    terrain: bool,

    /// Export each character's visibility
    #[arg(long)]
    seen: bool,

    /// Export each character's visibility as a solid overlay
    #[arg(long)]
    seen_solid: bool,

    /// Skip layers with nothing on them
    #[arg(long)]
    skip_empty: bool,

    /// Tile edge length in pixels
    #[arg(long, default_value = "256")]
    tile_size: u32,

    /// PostgreSQL connection string for the geometry export
    #[arg(long)]
    database: Option<String>,

    /// Write terrain cells to map.db in the output directory
    #[arg(long)]
    sqlite: bool,
}

impl Args {
    fn selection(&self) -> LayerSelection {
        let mut selection = LayerSelection {
            terrain: self.terrain,
            seen: self.seen,
            seen_solid: self.seen_solid,
            skip_empty: self.skip_empty,
            ..Default::default()
        };
        if !self.layers.is_empty() {
            selection.layers = self.layers.clone();
        }
        if !(self.terrain || self.seen || self.seen_solid) {
            selection.terrain = true;
        }
        selection
    }

    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            metrics: CellMetrics::default(),
            pyramid: PyramidConfig {
                tile_size: self.tile_size,
                pad: !self.no_pad,
                resume: self.resume,
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !(args.text || args.images || args.tiles || args.sqlite || args.database.is_some()) {
        bail!("nothing to do: pass at least one of --text, --images, --tiles, --sqlite, --database");
    }
    if args.tile_size == 0 {
        bail!("--tile-size must be positive");
    }
    let selection = args.selection();
    selection.validate()?;
    let config = args.render_config();

    let save = SaveData::load(&args.save)
        .with_context(|| format!("reading save {}", args.save.display()))?;
    let (store, _) = load_template_store(&args.game, &save.mods)
        .with_context(|| format!("loading game data from {}", args.game.display()))?;
    let world = build_world(&save, &store).context("assembling world")?;
    drop(save);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut manifest = RunManifest::new(&world, &selection.layers);

    if args.text {
        manifest.text_files = export_text(&world, &selection, &args.output).context("text export")?;
    }

    if args.images || args.tiles {
        let export = export_images(&world, &selection, &args.output, &config, args.images, args.tiles)
            .context("image export")?;
        manifest.record_images(&export);
    }

    if args.sqlite {
        manifest.sqlite_cells = export_sqlite(&world, &selection, &config.metrics, &args.output)
            .context("sqlite export")?;
    }

    if let Some(connection) = &args.database {
        let mut sink = PostgisSink::connect(connection).context("connecting to database")?;
        manifest.geometry_cells = export_geometry(&world, &selection, &config.metrics, &mut sink)
            .context("geometry export")?;
    }

    write_manifest(&args.output, &manifest).context("writing manifest")?;
    info!("Done: {}", args.output.display());
    Ok(())
}
