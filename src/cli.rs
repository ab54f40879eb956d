//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;

use crate::bubbles::place::StackingMode;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "COMIC_PANELS_DEBUG")]
    /// Enable debug logging. Env: COMIC_PANELS_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "8080", env = "COMIC_PANELS_PORT")]
    /// http listener, defaults to `8080`.
    /// Env: COMIC_PANELS_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "COMIC_PANELS_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: COMIC_PANELS_LISTEN_ADDRESS
    pub listen_address: String,
    #[clap(
        long,
        default_value = "http://localhost:8080",
        env = "COMIC_PANELS_PUBLIC_BASE_URL"
    )]
    /// Base URL stored panel links are built from.
    /// Env: COMIC_PANELS_PUBLIC_BASE_URL
    pub public_base_url: String,

    #[clap(long, short, env = "COMIC_PANELS_DATABASE_PATH")]
    /// Path to the database file, eg `/data/comic-panels.sqlite`.
    /// Env: COMIC_PANELS_DATABASE_PATH
    pub database_path: Option<String>,

    #[clap(long, short, env = "COMIC_PANELS_IMAGE_DIR")]
    /// Where finished panels are stored, defaults to `./images`.
    /// Env: COMIC_PANELS_IMAGE_DIR
    pub image_dir: Option<PathBuf>,

    #[clap(long, short, env = "COMIC_PANELS_FONT")]
    /// TTF/OTF file used for dialogue text.
    /// Env: COMIC_PANELS_FONT
    pub font: PathBuf,

    #[clap(long, env = "COMIC_PANELS_BOLD_FONT")]
    /// Optional bold face for speaker names; synthesised when absent.
    /// Env: COMIC_PANELS_BOLD_FONT
    pub bold_font: Option<PathBuf>,

    #[clap(
        long,
        value_enum,
        default_value_t = StackingMode::SourceCompatible,
        env = "COMIC_PANELS_STACKING"
    )]
    /// How bubbles after the first are stacked.
    /// Env: COMIC_PANELS_STACKING
    pub stacking: StackingMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_and_stacking() {
        let opts = CliOptions::try_parse_from(["comic-panels", "--font", "/fonts/a.ttf"])
            .expect("parse");
        assert_eq!(opts.port.get(), 8080);
        assert_eq!(opts.stacking, StackingMode::SourceCompatible);
        assert!(opts.bold_font.is_none());

        let opts = CliOptions::try_parse_from([
            "comic-panels",
            "--font",
            "/fonts/a.ttf",
            "--stacking",
            "cumulative",
        ])
        .expect("parse");
        assert_eq!(opts.stacking, StackingMode::Cumulative);
    }
}
