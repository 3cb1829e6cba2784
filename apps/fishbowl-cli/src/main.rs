mod script;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fishbowl_common::{ControllerConfig, Viewport};
use fishbowl_kernel::{SceneKind, Session};
use fishbowl_render::DebugTextRenderer;
use fishbowl_tools::SessionInspector;
use script::{Step, parse_step};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fishbowl-cli", about = "Headless driver for the fishbowl scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON controller configuration; defaults apply to missing fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the scene catalogue
    Info,
    /// Feed scripted input to a scene and print the resulting frame
    Simulate {
        /// Scene to construct (sphere, cube, plane, empty)
        #[arg(long, default_value = "sphere")]
        scene: SceneKind,
        /// Script steps, applied in order (e.g. `keydown:w`, `move:600,360`, `tick:10`)
        #[arg(short, long = "step")]
        steps: Vec<String>,
        /// Ticks to run after the script
        #[arg(short, long, default_value = "1")]
        ticks: u32,
        /// Milliseconds between ticks
        #[arg(long, default_value = "16")]
        dt: f64,
        /// Viewport as `WIDTHxHEIGHT`
        #[arg(long, default_value = "1280x720")]
        viewport: String,
        /// Also print the lifecycle event log
        #[arg(long)]
        events: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ControllerConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("fishbowl-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "bounds: half_extent={} (box {} margin {})",
                config.bounds().half_extent(),
                config.box_size,
                config.box_margin
            );
            let mut session = Session::new(config, Viewport::default());
            for kind in SceneKind::ALL {
                session.switch_scene(kind)?;
                if let Some(summary) = SessionInspector::summary(&session) {
                    println!(
                        "scene {:<6} objects={} vertices={} manipulable={}",
                        kind,
                        summary.object_count,
                        summary.vertex_count,
                        summary.manipulation.is_some()
                    );
                }
            }
            session.shutdown()?;
        }
        Commands::Simulate {
            scene,
            steps,
            ticks,
            dt,
            viewport,
            events,
        } => {
            let steps = steps
                .iter()
                .map(|s| parse_step(s))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let viewport = parse_viewport(&viewport)?;

            let mut session = Session::new(config, viewport);
            let mut frame = session.switch_scene(scene)?;
            let mut time_ms = 0.0;
            let mut run = |session: &mut Session, count: u32| -> anyhow::Result<()> {
                for _ in 0..count {
                    time_ms += dt;
                    frame = session.tick(frame, time_ms)?;
                }
                Ok(())
            };

            for step in steps {
                match step {
                    Step::Event(event) => {
                        let gesture = session.handle_event(&event);
                        tracing::debug!(?event, ?gesture, "scripted event");
                    }
                    Step::Ticks(count) => run(&mut session, count)?,
                }
            }
            run(&mut session, ticks)?;

            let mut renderer = DebugTextRenderer::new();
            print!("{}", session.render(&mut renderer)?);
            if let Some(summary) = SessionInspector::summary(&session) {
                println!("{summary}");
            }
            for object in SessionInspector::inspect_objects(&session) {
                println!("{object}");
            }
            if events {
                for event in session.drain_events() {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
            session.shutdown()?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn parse_viewport(text: &str) -> anyhow::Result<Viewport> {
    let (w, h) = text
        .split_once('x')
        .with_context(|| format!("expected WIDTHxHEIGHT, got `{text}`"))?;
    let width: f32 = w.trim().parse().with_context(|| format!("bad width `{w}`"))?;
    let height: f32 = h.trim().parse().with_context(|| format!("bad height `{h}`"))?;
    anyhow::ensure!(width > 0.0 && height > 0.0, "viewport must be positive");
    Ok(Viewport::new(width, height))
}
