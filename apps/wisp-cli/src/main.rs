mod simulate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wisp_avatar::{ManualClock, Viewport};
use wisp_composer::{SceneConfig, load_models, setup_environment};
use wisp_render::{DebugTextRenderer, RenderView, Renderer};

#[derive(Parser)]
#[command(name = "wisp-cli", about = "Headless tool for the wisp scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Asset directory, overrides the config
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective rig constants
    Info,
    /// Print the effective configuration as YAML
    Config,
    /// Build the scene and print its node tree
    Scene {
        /// Wait for the model import before printing
        #[arg(long)]
        wait_models: bool,
    },
    /// Run the rig against a manual clock with scripted input
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Frame length in milliseconds
        #[arg(long, default_value = "16.6667")]
        frame_ms: f64,
        /// Frame at which the fast key is pressed
        #[arg(long)]
        fast_from: Option<u32>,
        /// Frame at which the fast key is released
        #[arg(long)]
        fast_to: Option<u32>,
        /// Hold the forward key for the whole run
        #[arg(long)]
        forward: bool,
        /// Emit one JSON object per frame
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if let Some(assets) = &cli.assets {
        config.assets.root = assets.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let viewport = Viewport::new(config.window.width, config.window.height);

    match cli.command {
        Commands::Info => {
            let player = &config.player;
            println!("wisp-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "speed: base={} fast={} key={:?}",
                player.base_speed, player.fast_speed, player.fast_key
            );
            println!(
                "wisp: offset={} amplitude={} wy={} wx={} roll={:?}",
                player.wisp.base_offset,
                player.wisp.amplitude,
                player.wisp.speed_y,
                player.wisp.speed_x,
                player.wisp.roll_mode
            );
            println!("bindings: {}", player.bindings.len());
            println!("assets: {}", config.assets.root.display());
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Scene { wait_models } => {
            let mut ctx = setup_environment(config, viewport)?;
            load_models(&mut ctx)?;
            if wait_models {
                simulate::wait_for_models(&mut ctx, Duration::from_secs(30))?;
            }
            let view = RenderView::from(ctx.player.camera());
            print!("{}", DebugTextRenderer.render(&ctx.scene, &view));
        }
        Commands::Simulate {
            frames,
            frame_ms,
            fast_from,
            fast_to,
            forward,
            json,
        } => {
            let mut ctx = setup_environment(config, viewport)?;
            let script = simulate::Script {
                frames,
                frame_ms,
                fast_from,
                fast_to,
                forward,
            };
            let mut clock = ManualClock::new();
            let samples = simulate::run(&mut ctx, &script, &mut clock)?;

            if json {
                for sample in &samples {
                    println!("{}", serde_json::to_string(sample)?);
                }
            } else {
                for s in &samples {
                    println!(
                        "{:>5} t={:>9.2}ms {:<6} speed={:.1} cam=({:.2}, {:.2}, {:.2}) wisp=({:.4}, {:.4}) roll={:.4}",
                        s.frame,
                        s.t_ms,
                        s.speed_mode,
                        s.speed,
                        s.camera.x,
                        s.camera.y,
                        s.camera.z,
                        s.wisp_offset.x,
                        s.wisp_offset.y,
                        s.roll
                    );
                }
                let view = RenderView::from(ctx.player.camera());
                print!("{}", DebugTextRenderer.render(&ctx.scene, &view));
            }
        }
    }

    Ok(())
}
