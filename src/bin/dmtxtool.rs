use clap::{Args, Parser, Subcommand};
use dmtx_rescue::config;
use dmtx_rescue::models::{AdaptiveMethod, ParameterSet, Region, ResultLog};
use dmtx_rescue::presets::PresetCatalog;
use dmtx_rescue::session::{PaintColor, Session};
use dmtx_rescue::settings::SessionSettings;
use dmtx_rescue::storage::FileStorage;
use dmtx_rescue::tools::{binary_stats, format_log, grayscale_stats, to_grayscale};
use dmtx_rescue::{
    DecodeOrchestrator, ResultLogEntry, RunState, Symbology, TransformPipeline, decoder_for,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "dmtxtool", version, about = "Matrix barcode rescue tools")]
struct Cli {
    /// Preset store (default: $DMTX_PRESETS_PATH or datamatrix_presets.ini)
    #[arg(long, global = true)]
    presets: Option<PathBuf>,
    /// Settings store (default: $DMTX_SETTINGS_PATH or datamatrix_settings.ini)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Symbol family to read: datamatrix or qr
    #[arg(long, global = true, default_value = "datamatrix")]
    symbology: Symbology,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode the region once with the current settings
    Decode {
        #[command(flatten)]
        image: ImageArgs,
        #[command(flatten)]
        params: ParamArgs,
        /// Time budget in ms (default: manual timeout from settings)
        #[arg(long, allow_negative_numbers = true)]
        timeout: Option<i64>,
    },
    /// Try every stored preset on the region
    Sweep {
        #[command(flatten)]
        image: ImageArgs,
        /// Time budget per preset in ms (default: sweep timeout from settings)
        #[arg(long, allow_negative_numbers = true)]
        timeout: Option<i64>,
    },
    /// Store the current settings as a new named preset
    SavePreset {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Write the binarized region as a PNG
    Preview {
        #[command(flatten)]
        image: ImageArgs,
        #[command(flatten)]
        params: ParamArgs,
        #[arg(long)]
        out: PathBuf,
        /// Write the full-size binary image instead of a thumbnail
        #[arg(long)]
        full: bool,
    },
    /// Show effective settings, optionally saving overrides
    Settings {
        #[command(flatten)]
        params: ParamArgs,
        #[arg(long, allow_negative_numbers = true)]
        manual_timeout: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        sweep_timeout: Option<i64>,
        /// Persist the result
        #[arg(long)]
        write: bool,
    },
}

/// Image preparation. Upscaling happens first; `--paint` and `--region`
/// coordinates refer to the upscaled image.
#[derive(Args)]
struct ImageArgs {
    #[arg(long)]
    image: PathBuf,
    /// x1,y1,x2,y2 (default: whole image)
    #[arg(long)]
    region: Option<Region>,
    #[arg(long)]
    upscale: Option<f64>,
    /// x,y centre of a repair stroke; repeatable
    #[arg(long, value_parser = parse_point)]
    paint: Vec<(u32, u32)>,
    #[arg(long, default_value_t = 3)]
    brush: u32,
    /// black or white
    #[arg(long, default_value = "black")]
    color: PaintColor,
}

/// Overrides applied on top of the stored settings
#[derive(Args)]
struct ParamArgs {
    #[arg(long)]
    thresh: Option<u8>,
    #[arg(long)]
    inverse: Option<bool>,
    #[arg(long)]
    erode_size: Option<u32>,
    #[arg(long)]
    erode_iter: Option<u32>,
    #[arg(long)]
    close_size: Option<u32>,
    #[arg(long)]
    open_size: Option<u32>,
    #[arg(long)]
    sharpness: Option<u32>,
    #[arg(long)]
    denoise: Option<u32>,
    #[arg(long)]
    adaptive: Option<bool>,
    #[arg(long, value_parser = parse_method)]
    method: Option<AdaptiveMethod>,
    #[arg(long)]
    block_raw: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    adaptive_c: Option<i32>,
}

impl ParamArgs {
    fn apply(&self, base: ParameterSet) -> ParameterSet {
        ParameterSet {
            threshold_value: self.thresh.unwrap_or(base.threshold_value),
            inverse: self.inverse.unwrap_or(base.inverse),
            erode_size: self.erode_size.unwrap_or(base.erode_size),
            erode_iter: self.erode_iter.unwrap_or(base.erode_iter),
            close_size: self.close_size.unwrap_or(base.close_size),
            open_size: self.open_size.unwrap_or(base.open_size),
            sharpness: self.sharpness.unwrap_or(base.sharpness),
            denoise_strength: self.denoise.unwrap_or(base.denoise_strength),
            use_adaptive_threshold: self.adaptive.unwrap_or(base.use_adaptive_threshold),
            adaptive_method: self.method.unwrap_or(base.adaptive_method),
            adaptive_block_raw: self.block_raw.unwrap_or(base.adaptive_block_raw),
            adaptive_c: self.adaptive_c.unwrap_or(base.adaptive_c),
        }
    }
}

fn parse_point(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok((x, y))
}

fn parse_method(s: &str) -> Result<AdaptiveMethod, String> {
    s.parse()
        .map_err(|_| format!("unknown adaptive method '{s}' (expected MEAN or GAUSSIAN)"))
}

fn main() -> ExitCode {
    let default_filter = if config::debug_enabled() { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let cli = Cli::parse();
    let presets = FileStorage::new(
        cli.presets
            .clone()
            .unwrap_or_else(|| config::presets_path().to_path_buf()),
    );
    let settings = FileStorage::new(
        cli.settings
            .clone()
            .unwrap_or_else(|| config::settings_path().to_path_buf()),
    );

    let result = match cli.command {
        Command::Decode {
            image,
            params,
            timeout,
        } => decode_cmd(&settings, &image, &params, timeout, cli.symbology, cli.json),
        Command::Sweep { image, timeout } => {
            sweep_cmd(presets, &settings, &image, timeout, cli.symbology, cli.json)
        }
        Command::SavePreset { name, params } => save_preset_cmd(presets, &settings, &name, &params),
        Command::Preview {
            image,
            params,
            out,
            full,
        } => preview_cmd(&settings, &image, &params, &out, full),
        Command::Settings {
            params,
            manual_timeout,
            sweep_timeout,
            write,
        } => settings_cmd(settings, &params, manual_timeout, sweep_timeout, write, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_notes(notes: &[String]) {
    for note in notes {
        eprintln!("note: {note}");
    }
}

fn load_settings(storage: &FileStorage) -> SessionSettings {
    let load = SessionSettings::load(storage);
    print_notes(&load.notes);
    load.settings
}

fn prepare_session(args: &ImageArgs, params: ParameterSet) -> Result<Session, Box<dyn Error>> {
    let mut session = Session::new(params);
    session.load_path(&args.image)?;
    if let Some(factor) = args.upscale {
        let (w, h) = session.upscale(factor)?;
        eprintln!("Upscaled to {w}x{h}");
    }
    for &(x, y) in &args.paint {
        if !session.paint(x, y, args.brush, args.color)? {
            eprintln!("note: paint stroke at {x},{y} is empty after clipping");
        }
    }

    let region = match args.region {
        Some(region) => region,
        None => {
            let (w, h) = session
                .image()
                .map(|img| img.dimensions())
                .unwrap_or_default();
            Region::new(0, 0, w, h)
        }
    };
    session.select(region);
    Ok(session)
}

fn print_log(log: &ResultLog, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string_pretty(log)?);
    } else {
        print!("{}", format_log(log));
    }
    Ok(())
}

fn decode_cmd(
    settings: &FileStorage,
    image: &ImageArgs,
    params: &ParamArgs,
    timeout: Option<i64>,
    symbology: Symbology,
    json: bool,
) -> CliResult {
    let stored = load_settings(settings);
    let session = prepare_session(image, params.apply(stored.params))?;
    let mut orchestrator = DecodeOrchestrator::new(decoder_for(symbology));
    let log = orchestrator.run_manual(&session, timeout.unwrap_or(stored.manual_timeout_ms))?;
    print_log(log, json)
}

fn sweep_cmd(
    mut presets: FileStorage,
    settings: &FileStorage,
    image: &ImageArgs,
    timeout: Option<i64>,
    symbology: Symbology,
    json: bool,
) -> CliResult {
    let stored = load_settings(settings);
    let load = PresetCatalog::load(&mut presets);
    print_notes(&load.notes);

    let mut session = prepare_session(image, stored.params)?;
    let mut orchestrator = DecodeOrchestrator::new(decoder_for(symbology));
    let mut progress = |_state: RunState, entry: &ResultLogEntry| {
        if !json {
            eprintln!("  {entry}");
        }
    };
    let log = orchestrator.run_sweep_with(
        &mut session,
        &load.catalog,
        timeout.unwrap_or(stored.sweep_timeout_ms),
        &mut progress,
    )?;
    print_log(log, json)
}

fn save_preset_cmd(
    mut presets: FileStorage,
    settings: &FileStorage,
    name: &str,
    params: &ParamArgs,
) -> CliResult {
    let stored = load_settings(settings);
    let mut load = PresetCatalog::load(&mut presets);
    print_notes(&load.notes);
    let id = load
        .catalog
        .append(name, params.apply(stored.params), &mut presets)?;
    println!(
        "Saved preset '{name}' as {}{id} in {}",
        dmtx_rescue::presets::SECTION_PREFIX,
        presets.path().display()
    );
    Ok(())
}

fn preview_cmd(
    settings: &FileStorage,
    image: &ImageArgs,
    params: &ParamArgs,
    out: &std::path::Path,
    full: bool,
) -> CliResult {
    let stored = load_settings(settings);
    let session = prepare_session(image, params.apply(stored.params))?;
    let pipeline = TransformPipeline::new();

    if let Some(rgb) = session.image() {
        let stats = grayscale_stats(&to_grayscale(rgb));
        eprintln!(
            "Grayscale range: {}-{}, average: {}",
            stats.min, stats.max, stats.avg
        );
    }

    let output = if full {
        let rgb = session.image().ok_or("no image loaded")?;
        let binary = pipeline.run(rgb, session.selection(), session.params())?;
        let stats = binary_stats(&binary);
        eprintln!(
            "Binary: black_pixels={} total={} black_ratio={:.2}%",
            stats.black_pixels,
            stats.total_pixels,
            stats.black_ratio * 100.0
        );
        binary.to_gray_image()
    } else {
        session.preview(&pipeline)?
    };
    output.save(out)?;
    println!("Wrote {} ({}x{})", out.display(), output.width(), output.height());
    Ok(())
}

fn settings_cmd(
    mut storage: FileStorage,
    params: &ParamArgs,
    manual_timeout: Option<i64>,
    sweep_timeout: Option<i64>,
    write: bool,
    json: bool,
) -> CliResult {
    let stored = load_settings(&storage);
    let settings = SessionSettings {
        params: params.apply(stored.params),
        manual_timeout_ms: manual_timeout.unwrap_or(stored.manual_timeout_ms),
        sweep_timeout_ms: sweep_timeout.unwrap_or(stored.sweep_timeout_ms),
    };
    settings.params.validate()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings.params)?);
    } else {
        print!("{}", settings.to_document()?);
    }
    if write {
        settings.save(&mut storage)?;
        eprintln!("Saved settings to {}", storage.path().display());
    }
    Ok(())
}
