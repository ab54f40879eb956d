use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use comic_panels::bubbles::place::StackingMode;
use comic_panels::bubbles::text::{DeterministicTypeface, FontdueTypeface, Typeface};
use comic_panels::bubbles::{LayoutOptions, render_with};
use comic_panels::fetch::ImageFetcher;

/// Draw speech bubbles onto a single comic panel.
///
///   render_panel panel.png --line "Vincent: Hi" --line "Adrien: Hello" --font comic.ttf
#[derive(Parser, Debug)]
#[command(name = "render_panel")]
#[command(about = "Draw speech bubbles onto one panel image")]
struct Args {
    /// Local image path, or an http(s) URL to fetch
    source: String,

    /// Dialogue line, `Speaker: text`. Repeat for more lines.
    #[arg(long = "line", short = 'l')]
    lines: Vec<String>,

    /// TTF/OTF file for dialogue text
    #[arg(long, env = "COMIC_PANELS_FONT", required_unless_present = "deterministic_font")]
    font: Option<PathBuf>,

    /// Optional bold face for speaker names
    #[arg(long, env = "COMIC_PANELS_BOLD_FONT")]
    bold_font: Option<PathBuf>,

    /// Use fixed-width block glyphs instead of a font file
    #[arg(long)]
    deterministic_font: bool,

    /// How bubbles after the first are stacked
    #[arg(long, value_enum, default_value_t = StackingMode::SourceCompatible)]
    stacking: StackingMode,

    /// Where to write the PNG
    #[arg(long, short, default_value = "panel_with_text.png")]
    output: PathBuf,
}

async fn read_source(source: &str) -> Result<Vec<u8>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let fetcher = ImageFetcher::new()?;
        Ok(fetcher
            .fetch(source)
            .await
            .with_context(|| format!("Failed to fetch {source}"))?)
    } else {
        fs::read(source).with_context(|| format!("Failed to read {source}"))
    }
}

fn load_typeface(args: &Args) -> Result<Box<dyn Typeface>> {
    if args.deterministic_font {
        return Ok(Box::new(DeterministicTypeface::default()));
    }
    let font = args
        .font
        .as_deref()
        .ok_or_else(|| anyhow!("--font or --deterministic-font is required"))?;
    let typeface = FontdueTypeface::load(font, args.bold_font.as_deref())
        .with_context(|| format!("Failed to load font {}", font.display()))?;
    Ok(Box::new(typeface))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let typeface = load_typeface(&args)?;
    let image = read_source(&args.source).await?;
    let options = LayoutOptions {
        stacking: args.stacking,
    };

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    render_with(
        typeface.as_ref(),
        &image,
        &args.lines,
        Some(args.output.as_path()),
        options,
    )
    .with_context(|| format!("Failed to render {}", args.source))?;

    println!("{}", args.output.display());
    Ok(())
}
