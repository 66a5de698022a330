//! Prowl CLI
//!
//! Renders built-in scenes through the in-memory backend and reports the
//! geometry each frame produces.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prowl_paint::{Canvas, CanvasConfig, RecordingRenderer};

mod scenes;

use scenes::Scene;

#[derive(Parser)]
#[command(name = "prowl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Prowl vector canvas geometry generator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Canvas configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene and print per-frame geometry statistics
    Render {
        /// Scene name (see `prowl scenes`)
        #[arg(default_value = "all")]
        scene: String,

        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,

        /// Also print every draw call
        #[arg(long)]
        calls: bool,
    },

    /// List the built-in scenes
    Scenes,

    /// Print the effective canvas configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            scene,
            frames,
            calls,
        } => cmd_render(config, &scene, frames, calls),
        Commands::Scenes => cmd_scenes(),
        Commands::Config => cmd_config(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<CanvasConfig> {
    let Some(path) = path else {
        return Ok(CanvasConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = CanvasConfig::from_toml_str(&source)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn cmd_render(config: CanvasConfig, scene: &str, frames: u32, show_calls: bool) -> Result<()> {
    let scene: Scene = scene.parse()?;
    let mut canvas = Canvas::with_config(config).context("Failed to create canvas")?;
    let mut renderer = RecordingRenderer::new();

    info!("Rendering scene '{}' for {} frame(s)", scene, frames);

    for frame in 0..frames {
        canvas.clear();
        scene.draw(&mut canvas, &mut renderer, frame);
        canvas.render(&mut renderer);

        let stats = canvas.stats();
        println!(
            "frame {:>3}: {:>6} vertices  {:>6} triangles  {:>3} draw calls",
            frame,
            stats.vertices,
            stats.indices / 3,
            stats.draw_calls
        );

        if show_calls {
            for (i, (range, call)) in canvas.frame().ranges().enumerate() {
                println!(
                    "    call {:>3}: indices {:>6}..{:<6} brush {:?} scissor {}",
                    i,
                    range.start,
                    range.end,
                    call.brush.kind,
                    if call.scissor.is_enabled() { "on" } else { "off" }
                );
            }
        }
    }

    Ok(())
}

fn cmd_scenes() -> Result<()> {
    for scene in Scene::ALL {
        println!("{:<10} {}", scene.to_string(), scene.description());
    }
    Ok(())
}

fn cmd_config(config: &CanvasConfig) -> Result<()> {
    let text = config
        .to_toml_string()
        .context("Failed to serialize configuration")?;
    print!("{text}");
    Ok(())
}
