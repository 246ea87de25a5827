//! CLI binary for glyphgrid.
//!
//! A thin shim over the library crate that decodes page images, maps CLI
//! flags to `SegmentConfig`, and reports per-page calibration results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use glyphgrid::{segment_page, Layout, Overlay, PixelBuffer, SegmentConfig};
use image::{GrayImage, Rgba, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Calibrate one page and print its layout
  glyphgrid page-002.png

  # Whole document (directory of decoded page PNGs), machine-readable
  glyphgrid --json files/doc/png/ > layout.json

  # Export every glyph cell as a grayscale PNG (training data)
  glyphgrid --dump-glyphs cells/ files/doc/png/

  # Write debug overlays with every detected boundary drawn in red
  glyphgrid --overlay debug/ page-002.png

  # Looser thresholds for a noisy scan
  glyphgrid --caret-cutoff 250 --left-cutoff 220 --right-cutoff 230 page.png

CUTOFFS:
  A pixel counts as ink when any of R, G, B falls below the cutoff. Caret
  marks are near-black (default cutoff 254); glyph ink is anti-aliased and
  lighter, so the payload block's left/right edges use looser cutoffs
  (230 / 240). The asymmetry is intentional — it was tuned on real pages.

SCOPE:
  Inputs must already be decoded page images (PNG). Extracting images from
  a PDF and classifying the exported glyphs are separate tools.
"#;

/// Calibrate page images and slice their base64 glyph grids.
#[derive(Parser, Debug)]
#[command(
    name = "glyphgrid",
    version,
    about = "Locate and slice base64 glyph grids hidden in rendered page images",
    long_about = "Self-calibrating segmentation for payloads smuggled into page images as a \
76-column base64 text grid. Detects the per-row caret anchors, derives line spacing and \
column width from pixels alone, and slices every glyph cell for an external classifier.",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Page image files (PNG) or directories containing them.
    inputs: Vec<PathBuf>,

    /// Write each glyph cell as a grayscale PNG into this directory.
    #[arg(long, value_name = "DIR")]
    dump_glyphs: Option<PathBuf>,

    /// Write a copy of each page with detected boundaries drawn, into this directory.
    #[arg(long, value_name = "DIR")]
    overlay: Option<PathBuf>,

    /// Output per-page reports as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Near-white cutoff for caret scans.
    #[arg(long, env = "GLYPHGRID_CARET_CUTOFF", default_value_t = 254)]
    caret_cutoff: u8,

    /// Cutoff for the payload block's left edge.
    #[arg(long, env = "GLYPHGRID_LEFT_CUTOFF", default_value_t = 230)]
    left_cutoff: u8,

    /// Cutoff for the payload block's right edge.
    #[arg(long, env = "GLYPHGRID_RIGHT_CUTOFF", default_value_t = 240)]
    right_cutoff: u8,

    /// Reference page height the pixel-space constants were measured at.
    #[arg(long, default_value_t = 3375.0)]
    reference_height: f64,

    /// Maximum caret rows to walk per page.
    #[arg(long, default_value_t = 65)]
    max_rows: usize,

    /// Right shift applied to the red channel for glyph intensities.
    #[arg(long, env = "GLYPHGRID_SHIFT", default_value_t = 0)]
    intensity_shift: u8,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

// ── Debug overlay sink ───────────────────────────────────────────────────────

/// Draws every reported boundary segment in red on a copy of the page.
struct OverlayImage {
    img: RgbaImage,
}

impl OverlayImage {
    const INK: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn new(page: &RgbaImage) -> Self {
        Self { img: page.clone() }
    }

    fn put(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && (x as u32) < self.img.width() && (y as u32) < self.img.height() {
            self.img.put_pixel(x as u32, y as u32, Self::INK);
        }
    }
}

impl Overlay for OverlayImage {
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        // All engine segments are axis-aligned; step the longer delta anyway
        // so a non-aligned segment still renders.
        let (dx, dy) = (x2 - x1, y2 - y1);
        let steps = dx.abs().max(dy.abs());
        if steps == 0 {
            self.put(x1, y1);
            return;
        }
        for i in 0..=steps {
            let x = x1 + (dx as f64 * i as f64 / steps as f64).round() as i32;
            let y = y1 + (dy as f64 * i as f64 / steps as f64).round() as i32;
            self.put(x, y);
        }
    }
}

// ── Per-page report ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PageReport {
    path: PathBuf,
    width: u32,
    height: u32,
    carets: usize,
    glyphs: usize,
    layout: Layout,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = SegmentConfig::builder()
        .caret_cutoff(cli.caret_cutoff)
        .left_cutoff(cli.left_cutoff)
        .right_cutoff(cli.right_cutoff)
        .reference_page_height(cli.reference_height)
        .max_rows(cli.max_rows)
        .intensity_shift(cli.intensity_shift)
        .build()
        .context("Invalid configuration")?;

    // ── Collect page images ──────────────────────────────────────────────
    let pages = collect_pages(&cli.inputs)?;
    if pages.is_empty() {
        bail!("No PNG page images found in the given inputs");
    }

    if let Some(ref dir) = cli.dump_glyphs {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    if let Some(ref dir) = cli.overlay {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && pages.len() > 1;
    let bar = if show_progress {
        let b = ProgressBar::new(pages.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        b.set_prefix("Segmenting");
        Some(b)
    } else {
        None
    };

    // ── Process pages ────────────────────────────────────────────────────
    let start = Instant::now();
    let mut reports: Vec<PageReport> = Vec::with_capacity(pages.len());
    let mut failures = 0usize;

    for (page_idx, path) in pages.iter().enumerate() {
        if let Some(ref b) = bar {
            b.set_message(path.file_name().unwrap_or_default().to_string_lossy().to_string());
        }

        match process_page(path, page_idx, &config, &cli) {
            Ok(report) => {
                if let Some(ref b) = bar {
                    b.println(format!(
                        "  {} {}  {} carets, {} glyphs",
                        green("✓"),
                        path.display(),
                        report.carets,
                        report.glyphs,
                    ));
                }
                reports.push(report);
            }
            Err(e) => {
                failures += 1;
                let line = format!("  {} {}  {e:#}", red("✗"), path.display());
                match bar {
                    Some(ref b) => b.println(line),
                    None => eprintln!("{line}"),
                }
            }
        }
        if let Some(ref b) = bar {
            b.inc(1);
        }
    }
    if let Some(b) = bar {
        b.finish_and_clear();
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialise reports")?
        );
    } else if !cli.quiet {
        for r in &reports {
            println!(
                "{}  {}x{}  {} carets  {} glyphs  line {:.2}px  col {:.2}px  block [{}, {}]",
                bold(&r.path.display().to_string()),
                r.width,
                r.height,
                r.carets,
                r.glyphs,
                r.layout.line_height,
                r.layout.column_width,
                r.layout.base64_left,
                r.layout.base64_right,
            );
        }
        eprintln!(
            "{} {}/{} pages segmented in {}ms",
            if failures == 0 { green("✔") } else { red("✘") },
            bold(&reports.len().to_string()),
            pages.len(),
            start.elapsed().as_millis(),
        );
    }

    if reports.is_empty() {
        bail!("All {} pages failed segmentation", pages.len());
    }
    Ok(())
}

/// Segment one page: decode, calibrate, slice, and honour dump/overlay flags.
fn process_page(
    path: &Path,
    page_idx: usize,
    config: &SegmentConfig,
    cli: &Cli,
) -> Result<PageReport> {
    let page = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();
    let buffer = PixelBuffer::from_rgba_image(&page);

    let mut sink = cli.overlay.as_ref().map(|_| OverlayImage::new(&page));
    let overlay = sink.as_mut().map(|s| s as &mut dyn Overlay);

    let segmentation = segment_page(buffer, config, overlay)
        .with_context(|| format!("Calibration failed for {}", path.display()))?;
    let carets = segmentation.carets.len();
    let layout = segmentation.layout.clone();

    let mut glyph_count = 0usize;
    for glyph in segmentation.glyphs() {
        let glyph = glyph.with_context(|| format!("Slicing failed for {}", path.display()))?;
        if let Some(ref dir) = cli.dump_glyphs {
            let img = GrayImage::from_raw(glyph.width, glyph.height, glyph.intensity.clone())
                .context("Glyph bitmap size mismatch")?;
            let name = format!("page-{page_idx:03}-r{:02}-c{:02}.png", glyph.row, glyph.col);
            img.save(dir.join(&name))
                .with_context(|| format!("Failed to write glyph {name}"))?;
        }
        glyph_count += 1;
    }

    if let (Some(dir), Some(sink)) = (cli.overlay.as_ref(), sink) {
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let out = dir.join(format!("{name}-overlay.png"));
        sink.img
            .save(&out)
            .with_context(|| format!("Failed to write overlay {}", out.display()))?;
    }

    Ok(PageReport {
        path: path.to_path_buf(),
        width: page.width(),
        height: page.height(),
        carets,
        glyphs: glyph_count,
        layout,
    })
}

/// Expand files and directories into a sorted list of PNG page paths.
fn collect_pages(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(input)
                .with_context(|| format!("Failed to read directory {}", input.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| {
                    p.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
                })
                .collect();
            // Page order is encoded in the file names.
            entries.sort();
            pages.extend(entries);
        } else if input.exists() {
            pages.push(input.clone());
        } else {
            bail!("Input not found: {}", input.display());
        }
    }
    Ok(pages)
}
