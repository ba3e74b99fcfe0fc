use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use cake_cutter_core::check::verify;
use cake_cutter_core::{CutterConfig, Layout, Shape, arrange_layout, to_json};
use clap::{ArgAction, Args, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{ImageReader, RgbaImage};
use serde::Deserialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

mod compositing;

#[derive(Parser, Debug)]
#[command(
    name = "cake-cutter",
    about = "Cut large images into fixed-size padded containers and stitch them back",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the layout only (reads image dimensions, writes no pixels)
    Plan(PlanArgs),
    /// Cut images into container PNGs plus layout.json
    Cut(CutArgs),
    /// Rebuild the original images from container PNGs and layout.json
    Stitch(StitchArgs),
}

#[derive(Args, Debug, Clone)]
struct SizeArgs {
    /// Container size (WxH)
    #[arg(long, default_value = "512x512", help_heading = "Layout")]
    container: Shape,
    /// Overlap margin kept on each side of a tile (WxH)
    #[arg(long, default_value = "0x0", help_heading = "Layout")]
    padding: Shape,
    /// YAML config file path (overrides --container/--padding)
    #[arg(long, help_heading = "Layout")]
    config: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Layout")]
    print_config_format: String,
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
struct PlanArgs {
    /// Input image file or directory
    #[arg(help_heading = "Input/Output")]
    input: Option<PathBuf>,
    /// Explicit matrix sizes instead of (or in addition to) images: id=WxH
    #[arg(long = "size", help_heading = "Input/Output")]
    sizes: Vec<String>,
    #[command(flatten)]
    filter: InputArgs,
    /// Write the result here instead of stdout
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// Output format: json (flat export with stats) | layout (input for `stitch`)
    #[arg(long, default_value = "json", value_parser = ["json", "layout"], help_heading = "Export")]
    format: String,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Check overlap, bounds and coverage of the layout before writing
    #[arg(long, default_value_t = false, help_heading = "Export")]
    verify: bool,
    #[command(flatten)]
    sizes_cfg: SizeArgs,
}

#[derive(Parser, Debug, Clone)]
struct CutArgs {
    /// Input image file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Container base name (files will be name_<n>.png)
    #[arg(short, long, default_value = "container", help_heading = "Input/Output")]
    name: String,
    #[command(flatten)]
    filter: InputArgs,
    /// Draw red outlines around every piece (debug)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    outlines: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Check overlap, bounds and coverage of the layout before writing
    #[arg(long, default_value_t = false, help_heading = "Export")]
    verify: bool,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
    #[command(flatten)]
    sizes_cfg: SizeArgs,
}

#[derive(Parser, Debug, Clone)]
struct StitchArgs {
    /// layout.json written by `cut` (or `plan --format layout`)
    layout: PathBuf,
    /// Directory holding the container PNGs (defaults to the layout's directory)
    #[arg(long)]
    containers: Option<PathBuf>,
    /// Container base name used when cutting
    #[arg(short, long, default_value = "container")]
    name: String,
    /// Output directory for the rebuilt images
    #[arg(short, long, default_value = "stitched")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Plan(args) => run_plan(args, cli.progress && !cli.quiet),
        Commands::Cut(args) => run_cut(args, cli.progress && !cli.quiet),
        Commands::Stitch(args) => run_stitch(args),
    }
}

/// Returns `None` when the merged configuration was printed instead.
fn resolve_config(args: &SizeArgs) -> anyhow::Result<Option<CutterConfig>> {
    let base = CutterConfig::new(args.container).with_padding(args.padding);
    let cfg = if let Some(path) = &args.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.into_cutter_config(base)?
    } else {
        base
    };
    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(None);
    }
    cfg.validate()?;
    Ok(Some(cfg))
}

fn run_plan(args: &PlanArgs, show_progress: bool) -> anyhow::Result<()> {
    let Some(cfg) = resolve_config(&args.sizes_cfg)? else {
        return Ok(());
    };

    let mut matrices: Vec<(String, Shape)> = Vec::new();
    if let Some(input) = &args.input {
        let paths = gather_paths(input, &args.filter.include, &args.filter.exclude)?;
        matrices.extend(read_dimensions_with_progress(input, &paths, show_progress));
    }
    for s in &args.sizes {
        matrices.push(parse_size_entry(s)?);
    }
    anyhow::ensure!(!matrices.is_empty(), "nothing to plan: give an input path or --size");
    info!(count = matrices.len(), "matrices");

    let layout = arrange_layout(matrices.clone(), &cfg)?;
    if args.verify {
        check_layout(&layout, &matrices)?;
    }
    log_stats(&layout);

    let text = match args.format.as_str() {
        "layout" => serde_json::to_string_pretty(&layout)?,
        _ => serde_json::to_string_pretty(&to_json(&layout))?,
    };
    match &args.out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(?path, containers = layout.containers.len(), "layout written");
        }
        None => println!("{}", text),
    }
    if let Some(stats_path) = &args.export_stats {
        write_stats(stats_path, &layout)?;
    }
    Ok(())
}

fn run_cut(args: &CutArgs, show_progress: bool) -> anyhow::Result<()> {
    let Some(cfg) = resolve_config(&args.sizes_cfg)? else {
        return Ok(());
    };
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;

    let paths = gather_paths(&args.input, &args.filter.include, &args.filter.exclude)?;
    let images = load_images_with_progress(&args.input, &paths, show_progress)?;
    anyhow::ensure!(!images.is_empty(), "no images found under {}", args.input.display());
    info!(count = images.len(), "loaded input images");

    // sorted keys keep the container order reproducible
    let mut matrices: Vec<(String, Shape)> = images
        .iter()
        .map(|(k, img)| (k.clone(), Shape::new(img.width(), img.height())))
        .collect();
    matrices.sort_by(|a, b| a.0.cmp(&b.0));

    let layout = arrange_layout(matrices.clone(), &cfg)?;
    if args.verify {
        check_layout(&layout, &matrices)?;
    }
    log_stats(&layout);

    if !args.dry_run {
        let pages = compositing::render_containers(&layout, &images, args.outlines)?;
        for (i, page) in pages.iter().enumerate() {
            let png_path = args.out_dir.join(format!("{}_{}.png", args.name, i));
            page.save(&png_path)
                .with_context(|| format!("write {}", png_path.display()))?;
            info!(?png_path, id = i, "wrote container");
        }
        let json_path = args.out_dir.join("layout.json");
        fs::write(&json_path, serde_json::to_string_pretty(&layout)?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, containers = pages.len(), "layout written");
    }
    if let Some(stats_path) = &args.export_stats {
        write_stats(stats_path, &layout)?;
    }
    Ok(())
}

fn run_stitch(args: &StitchArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.layout)
        .with_context(|| format!("read {}", args.layout.display()))?;
    let layout: Layout<String> = serde_json::from_str(&text)
        .with_context(|| format!("parse {}", args.layout.display()))?;
    let dir = match &args.containers {
        Some(d) => d.clone(),
        None => args
            .layout
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut pages: Vec<RgbaImage> = Vec::with_capacity(layout.containers.len());
    for i in 0..layout.containers.len() {
        let p = dir.join(format!("{}_{}.png", args.name, i));
        let img = load_image(&p).with_context(|| format!("load {}", p.display()))?;
        let img = img.to_rgba8();
        if (img.width(), img.height()) != (layout.container.width, layout.container.height) {
            warn!(?p, width = img.width(), height = img.height(), "container size differs from layout");
        }
        pages.push(img);
    }

    let restored = compositing::stitch(&layout, &pages)?;
    for (key, img) in &restored {
        let out_path = stitched_path(&args.out_dir, key)?;
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        img.save(&out_path)
            .with_context(|| format!("write {}", out_path.display()))?;
        info!(?out_path, "restored image");
    }
    info!(images = restored.len(), "stitch done");
    Ok(())
}

/// Where the image for `key` is written: keys stay relative to `out_dir`, and keys without an
/// image extension get `.png` appended.
fn stitched_path(out_dir: &Path, key: &str) -> anyhow::Result<PathBuf> {
    let rel = Path::new(key);
    anyhow::ensure!(
        !key.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_))),
        "refusing to write image key '{}' outside the output directory",
        key
    );
    if is_image(rel) {
        Ok(out_dir.join(rel))
    } else {
        Ok(out_dir.join(format!("{key}.png")))
    }
}

fn check_layout(layout: &Layout<String>, matrices: &[(String, Shape)]) -> anyhow::Result<()> {
    let violations = verify(layout, matrices);
    for v in &violations {
        error!(%v, "layout check failed");
    }
    anyhow::ensure!(violations.is_empty(), "{} layout violations", violations.len());
    info!("layout verified");
    Ok(())
}

fn log_stats(layout: &Layout<String>) {
    let stats = layout.stats();
    info!(
        containers = stats.num_containers,
        pieces = stats.num_pieces,
        used_area = stats.used_area,
        total_area = stats.total_container_area,
        occupancy = %format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
}

fn write_stats(path: &Path, layout: &Layout<String>) -> anyhow::Result<()> {
    let stats = layout.stats();
    fs::write(path, serde_json::to_string_pretty(&stats)?)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn parse_size_entry(s: &str) -> anyhow::Result<(String, Shape)> {
    let (id, size) = s
        .split_once('=')
        .with_context(|| format!("expected id=WxH, got '{}'", s))?;
    let shape: Shape = size.parse().map_err(anyhow::Error::msg)?;
    Ok((id.trim().to_string(), shape))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

/// Key of an image: its path relative to the input root, with `/` separators.
fn image_key(root: &Path, p: &Path) -> String {
    let rel = if root.is_file() {
        p.file_name().map(Path::new).unwrap_or(p)
    } else {
        p.strip_prefix(root).unwrap_or(p)
    };
    rel.to_string_lossy().replace('\\', "/")
}

fn progress_bar(len: usize, verb: &str, show: bool) -> Option<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show {
        return None;
    }
    let b = ProgressBar::new(len as u64);
    let template = format!("{{spinner:.green}} {verb} {{pos}}/{{len}} [{{elapsed_precise}}] {{wide_msg}}");
    if let Ok(style) = ProgressStyle::with_template(&template) {
        b.set_style(style);
    }
    Some(b)
}

fn load_images_with_progress(
    root: &Path,
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<HashMap<String, RgbaImage>> {
    let bar = progress_bar(paths.len(), "loading", progress);
    let mut images = HashMap::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => {
                images.insert(image_key(root, p), img.to_rgba8());
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(images)
}

fn read_dimensions_with_progress(
    root: &Path,
    paths: &[PathBuf],
    progress: bool,
) -> Vec<(String, Shape)> {
    let bar = progress_bar(paths.len(), "reading", progress);
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        match image::image_dimensions(p) {
            Ok((w, h)) => list.push((image_key(root, p), Shape::new(w, h))),
            Err(e) => error!(?p, error = %e, "skip image"),
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    list
}

fn load_image(p: &Path) -> anyhow::Result<image::DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Optional overrides read from `--config`.
#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    container: Option<String>,
    padding: Option<String>,
    container_width: Option<u32>,
    container_height: Option<u32>,
    padding_width: Option<u32>,
    padding_height: Option<u32>,
}

impl YamlConfig {
    fn into_cutter_config(self, mut cfg: CutterConfig) -> anyhow::Result<CutterConfig> {
        if let Some(v) = self.container {
            cfg.container = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = self.padding {
            cfg.padding = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = self.container_width {
            cfg.container.width = v;
        }
        if let Some(v) = self.container_height {
            cfg.container.height = v;
        }
        if let Some(v) = self.padding_width {
            cfg.padding.width = v;
        }
        if let Some(v) = self.padding_height {
            cfg.padding.height = v;
        }
        Ok(cfg)
    }
}
