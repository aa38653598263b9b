use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use forcefield_core::ast::Scene;
use forcefield_core::diagnostics::format_parse_error;
use forcefield_core::runtime::evaluate_detectors;
use forcefield_core::{
    analyze_scene, build_simulation_context, get_particle_states, parse_scene, SimulationContext,
};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "forcefield")]
#[command(about = "Forcefield - fixed-step 2D particle dynamics", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene and print its detector readings
    Run {
        /// Path to the scene file
        file: PathBuf,
        /// Override the step count from the simulate line
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Parse and analyze a scene without running it
    Check {
        /// Path to the scene file
        file: PathBuf,
    },
    /// Run a scene and print particle states as CSV
    Trace {
        /// Path to the scene file
        file: PathBuf,
        /// Emit a row block every N steps
        #[arg(long, default_value_t = 1)]
        every: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Run { file, steps } => run_file(&file, steps),
        Commands::Check { file } => check_file(&file),
        Commands::Trace { file, every } => trace_file(&file, every),
    }
}

fn load_scene(file: &Path) -> Result<(String, Scene)> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read scene file {}", file.display()))?;
    let scene = match parse_scene(&source) {
        Ok(scene) => scene,
        Err(e) => bail!("{}", format_parse_error(&e, &source)),
    };
    debug!(
        "parsed {} particles, {} generators, {} detectors",
        scene.particles.len(),
        scene.generators.len(),
        scene.detectors.len()
    );
    Ok((source, scene))
}

fn build_context(file: &Path, source: &str, scene: &Scene) -> Result<SimulationContext> {
    // Warnings are logged by the build itself.
    for error in analyze_scene(scene).errors() {
        eprintln!("{}", error.render(source));
    }
    build_simulation_context(scene)
        .with_context(|| format!("failed to build simulation from {}", file.display()))
}

fn run_file(file: &Path, steps: Option<usize>) -> Result<()> {
    let (source, mut scene) = load_scene(file)?;
    if let Some(steps) = steps {
        scene.simulate.steps = steps;
    }

    let mut ctx = build_context(file, &source, &scene)?;
    ctx.run().context("simulation failed")?;
    info!("ran {} steps", ctx.steps_taken());

    for detector in evaluate_detectors(&scene, &ctx)? {
        println!("{} = {}", detector.name, detector.value);
    }
    Ok(())
}

fn check_file(file: &Path) -> Result<()> {
    let (source, scene) = load_scene(file)?;
    let diagnostics = analyze_scene(&scene);
    for diagnostic in diagnostics.iter() {
        eprintln!("{}", diagnostic.render(&source));
    }

    let errors = diagnostics.errors().count();
    if errors > 0 {
        bail!("{} has {} error(s)", file.display(), errors);
    }
    println!(
        "{}: ok ({} particles, {} generators, {} warning(s))",
        file.display(),
        scene.particles.len(),
        scene.generators.len(),
        diagnostics.warnings().count()
    );
    Ok(())
}

fn trace_file(file: &Path, every: usize) -> Result<()> {
    if every == 0 {
        bail!("--every must be at least 1");
    }
    let (source, scene) = load_scene(file)?;
    let mut ctx = build_context(file, &source, &scene)?;

    println!("step,name,x,y,vx,vy");
    print_states(&ctx);
    for _ in 0..ctx.steps {
        ctx.step().context("simulation failed")?;
        if ctx.steps_taken() % every == 0 {
            print_states(&ctx);
        }
    }
    Ok(())
}

fn print_states(ctx: &SimulationContext) {
    for named in get_particle_states(ctx) {
        let state = named.state;
        println!(
            "{},{},{},{},{},{}",
            ctx.steps_taken(),
            named.name,
            state.position.x,
            state.position.y,
            state.velocity.x,
            state.velocity.y
        );
    }
}
