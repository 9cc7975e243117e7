use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tga_atlas_rs::image_pipeline::{AtlasConfig, SpriteAtlasPipeline, TgaFormat};
use tga_atlas_rs::logger;

use tracing::{error, info};

/// Packs a numbered run of TGA sprites into one square power-of-two atlas.
#[derive(Parser, Debug)]
#[command(name = "tga_atlas", version, about, after_help = format_list())]
struct Cli {
    /// Sprite base name; reads <NAME>0.tga, <NAME>1.tga, ... and writes <NAME>.tga
    #[arg(value_name = "NAME")]
    sprite_name: PathBuf,

    /// Output format code, 0-9
    #[arg(value_name = "FORMAT")]
    format: TgaFormat,

    /// Skip writing the <NAME>.tga.ltc texture coordinate file
    #[arg(long)]
    no_uv_map: bool,

    /// Print per-step timings after a successful build
    #[arg(long)]
    timings: bool,
}

fn format_list() -> String {
    let mut text = String::from("Formats:\n");
    for format in TgaFormat::all() {
        text.push_str(&format!("{} - {}\n", format.code(), format));
    }
    text
}

/// Error, usage synopsis and format list shown for a bad command line.
fn usage_failure(e: &clap::Error) -> String {
    let mut text = e.render().to_string();
    // value errors (e.g. an unknown format code) come without a synopsis
    if !text.contains("Usage:") {
        text.push_str(&format!("\n{}\n", Cli::command().render_usage()));
    }
    text.push_str(&format!("\n{}", format_list()));
    text
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            println!("{}", usage_failure(&e));
            return ExitCode::FAILURE;
        }
    };

    logger::init();

    let config = AtlasConfig::builder()
        .format(cli.format)
        .emit_coordinates(!cli.no_uv_map)
        .build();
    let pipeline = SpriteAtlasPipeline::new(config);

    info!("Sprite atlas pipeline initialized");
    info!("Format: {} - {}", pipeline.config().format.code(), pipeline.config().format);
    info!(
        "UV map: {}",
        if pipeline.config().emit_coordinates {
            "enabled"
        } else {
            "disabled"
        }
    );

    match pipeline.build_atlas(&cli.sprite_name) {
        Ok(summary) => {
            println!("{} - success", summary.atlas_path.display());
            if cli.timings {
                summary.timings.print_summary();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Atlas build failed: {}", e);
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}
