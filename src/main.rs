use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use lanemesh::config::{FileConfig, OutputFormat};
use lanemesh::input::load_network;
use lanemesh::layers::{MeshConfig, generate_network};
use lanemesh::mesh::{
    MaterialCatalog, stl::estimate_stl_size, validate_and_fix, write_scene_json, write_stl,
};

/// Generate lane surface and lane marking meshes from a road network
///
/// Examples:
///   # Build STL meshes for a road network
///   lanemesh town.json
///
///   # Export a JSON scene with materials and texture coordinates
///   lanemesh town.toml --format json -o town-scene.json
///
///   # Denser sampling and longer dashes
///   lanemesh town.json --step 0.5 --dash-length 4.5 --gap-length 7.5
#[derive(Parser, Debug)]
#[command(name = "lanemesh")]
#[command(version, about, long_about = None)]
struct Args {
    /// Road network file (.json or .toml)
    input: Option<PathBuf>,

    /// Path to config file (optional, auto-searches lanemesh.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file path (defaults to the input name with the format's extension)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormat>,

    /// Base sampling step along the reference line in meters
    #[arg(long)]
    step: Option<f64>,

    /// Broken-line dash length in meters
    #[arg(long)]
    dash_length: Option<f64>,

    /// Broken-line gap length in meters
    #[arg(long)]
    gap_length: Option<f64>,

    /// Lift of lane marks above the road surface in meters
    #[arg(long)]
    mark_lift: Option<f64>,

    /// Build roads one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = match args.config {
        Some(ref path) => Some(FileConfig::from_path(path)?),
        None => FileConfig::load(),
    }
    .unwrap_or_default();

    let verbose = args.verbose || file_config.verbose;
    init_logging(verbose);

    let input = args
        .input
        .clone()
        .or_else(|| file_config.input.clone());
    let Some(input) = input else {
        bail!("No road network given: pass an input file or set `input` in lanemesh.toml");
    };
    let format = args.format.or(file_config.format).unwrap_or_default();
    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| input.with_extension(format.extension()));

    let mesh_config = merge_mesh_config(&args, &file_config)?;

    println!("lanemesh - Lane Mesh Generator");
    println!("==============================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Input: {}", input.display());
        println!("  Output: {} ({:?})", output_path.display(), format);
        println!("  Step: {}m", mesh_config.step);
        println!(
            "  Broken marks: {}m dash / {}m gap",
            mesh_config.dash_length, mesh_config.gap_length
        );
        println!("  Mark lift: {}m", mesh_config.mark_lift);
        println!(
            "  Road building: {}",
            if mesh_config.parallel { "parallel" } else { "sequential" }
        );
        println!();
    }

    let spinner = create_spinner("Loading road network...");
    let start = Instant::now();
    let network = load_network(&input).context("Failed to load road network")?;
    spinner.finish_with_message(format!(
        "Loaded {} roads, {} junctions [{:.1}s]",
        network.roads.len(),
        network.junctions.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Generating lane meshes...");
    let start = Instant::now();
    let mut output = generate_network(&network, &mesh_config);
    spinner.finish_with_message(format!(
        "Generated {} meshes, {} triangles [{:.1}s]",
        output.meshes.len(),
        output.triangle_count(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Validating meshes...");
    let mut issues = 0;
    for mesh in output.meshes.values_mut() {
        let report = validate_and_fix(mesh);
        if report.has_issues() {
            issues += 1;
            for warning in &report.warnings {
                log::warn!("{}", warning);
            }
        } else if verbose {
            log::debug!("{}: {}", mesh.name, report.summary());
        }
    }
    spinner.finish_with_message(format!(
        "Validated {} meshes ({} with issues)",
        output.meshes.len(),
        issues
    ));

    let spinner = create_spinner("Writing output...");
    let start = Instant::now();
    match format {
        OutputFormat::Stl => {
            write_stl(&output_path, output.meshes.values()).context("Failed to write STL file")?;
            spinner.finish_with_message(format!(
                "Wrote {} triangles ({:.1} KB) [{:.1}s]",
                output.triangle_count(),
                estimate_stl_size(output.triangle_count()) as f64 / 1024.0,
                start.elapsed().as_secs_f32()
            ));
        }
        OutputFormat::Json => {
            let catalog = MaterialCatalog::default();
            write_scene_json(&output_path, output.meshes.values(), &catalog)
                .context("Failed to write scene file")?;
            spinner.finish_with_message(format!(
                "Wrote {} meshes with {} materials [{:.1}s]",
                output.meshes.len(),
                catalog.len(),
                start.elapsed().as_secs_f32()
            ));
        }
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    println!("Output: {}", output_path.display());
    println!(
        "  {} meshes, {} vertices, {} triangles",
        output.meshes.len(),
        output.vertex_count(),
        output.triangle_count()
    );
    if !output.failures.is_empty() {
        println!("  {} lane meshes failed:", output.failures.len());
        for failure in &output.failures {
            println!("    {}: {}", failure.key, failure.error);
        }
    }

    Ok(())
}

/// Mesh parameters from the config file, overridden by command-line flags
fn merge_mesh_config(args: &Args, file_config: &FileConfig) -> Result<MeshConfig> {
    let mut config = file_config.mesh_config();
    if let Some(step) = args.step {
        config = config.with_step(step);
    }
    if args.dash_length.is_some() || args.gap_length.is_some() {
        let dash = args.dash_length.unwrap_or(config.dash_length);
        let gap = args.gap_length.unwrap_or(config.gap_length);
        config = config.with_dashes(dash, gap);
    }
    if let Some(lift) = args.mark_lift {
        config = config.with_mark_lift(lift);
    }
    if args.sequential {
        config = config.with_parallel(false);
    }

    if !(config.step > 0.0) {
        bail!("--step must be positive, got {}", config.step);
    }
    if !(config.dash_length > 0.0) || !(config.gap_length >= 0.0) {
        bail!(
            "Invalid dash pattern: dash {} m, gap {} m",
            config.dash_length,
            config.gap_length
        );
    }
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
