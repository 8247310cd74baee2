use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voxel_life::automaton::grid::{axis_seed, population};
use voxel_life::persistence::{load_grid, resolve_automaton_path, save_grid};
use voxel_life::render::{DisplayMode, HeadlessRenderer, Renderer};
use voxel_life::{Config, Grid, Simulation};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Saved automaton to load, relative to the automaton directory
    automaton: Option<String>,

    /// Custom config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible breeding
    #[arg(long)]
    seed: Option<u64>,

    /// Display backend (defaults to the window when built with it)
    #[arg(long, value_enum)]
    renderer: Option<RendererKind>,

    /// Frames the headless display shows before closing (0 runs forever)
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Whether to save the final grid
    #[arg(long, value_enum, default_value = "ask")]
    save: SaveChoice,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RendererKind {
    Headless,
    Window,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SaveChoice {
    Yes,
    No,
    Ask,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voxel_life=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read a y/n answer; anything but `y`, including end of input, means no.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Backend for this run. Hidden runs never open a window.
fn select_renderer(
    requested: Option<RendererKind>,
    mode: DisplayMode,
    window_built: bool,
) -> RendererKind {
    if mode == DisplayMode::Hidden {
        return RendererKind::Headless;
    }
    requested.unwrap_or(if window_built {
        RendererKind::Window
    } else {
        RendererKind::Headless
    })
}

fn drive<R: Renderer>(sim: Simulation<ChaCha8Rng>, mut renderer: R) -> Grid {
    sim.run(&mut renderer)
}

#[cfg(feature = "window")]
fn window_renderer() -> Result<voxel_life::render::WindowRenderer> {
    Ok(voxel_life::render::WindowRenderer::new("Voxel Life"))
}

#[cfg(not(feature = "window"))]
fn window_renderer() -> Result<HeadlessRenderer> {
    anyhow::bail!("this build has no window renderer; rebuild with `--features window`")
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("invalid configuration")?;
    let seed = args.seed.or(config.seed);
    let rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let (grid, params) = match &args.automaton {
        Some(name) => {
            let path = resolve_automaton_path(&config.automaton_dir, name);
            let grid = load_grid(&path)
                .with_context(|| format!("cannot start from {}", path.display()))?;
            println!("loaded {} active cells", population(&grid));
            (grid, config.loaded)
        }
        None => (axis_seed(config.grid_size)?, config.fresh),
    };

    println!("number of active cells: {}", population(&grid));

    let kind = select_renderer(args.renderer, params.display_mode, cfg!(feature = "window"));
    let sim = Simulation::new(grid, config.rule.to_rule(), params, rng)?;
    info!(?kind, ?seed, "starting renderer");

    let life = match kind {
        RendererKind::Headless => {
            let budget = (args.frames > 0).then_some(args.frames);
            drive(sim, HeadlessRenderer::new(budget))
        }
        RendererKind::Window => drive(sim, window_renderer()?),
    };

    println!("number of active cells: {}", population(&life));

    let save = match args.save {
        SaveChoice::Yes => true,
        SaveChoice::No => false,
        SaveChoice::Ask => confirm("save automaton? [y/n]")?,
    };
    if save {
        let path = save_grid(&life, &config.automaton_dir).context("failed to save automaton")?;
        println!("saved {}!", path.display());
    }

    Ok(())
}
