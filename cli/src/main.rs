use clap::{Parser, Subcommand};
use icroute_common::db::fixture::{CircuitFixture, TechFixture};
use icroute_common::util::config::Config;
use icroute_common::util::{generator, logger};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Routes the circuit named by the config's `[input]` section.
    Route {
        /// Re-run the connectivity checker after routing and fail with
        /// a non-zero exit code if any net is open or shorted.
        #[arg(long)]
        verify: bool,
    },
    /// Writes a synthetic tech/circuit fixture pair for `route` to consume.
    Generate {
        #[arg(long, default_value_t = 20)]
        nets: usize,
        #[arg(long, default_value_t = 10)]
        pitch: i64,
        #[arg(long, default_value = "inputs/tech.toml")]
        tech_output: String,
        #[arg(long, default_value = "inputs/circuit.toml")]
        circuit_output: String,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    let command = args.command.unwrap_or(Commands::Route { verify: false });

    match command {
        Commands::Generate {
            nets,
            pitch,
            tech_output,
            circuit_output,
        } => run_generate(nets, pitch, &tech_output, &circuit_output)?,
        Commands::Route { verify } => run_route(&config, verify)?,
    }

    Ok(())
}

fn prepare_output_dir(path_str: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path_str).parent() {
        if !parent.exists() && !parent.as_os_str().is_empty() {
            log::info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn run_generate(nets: usize, pitch: i64, tech_output: &str, circuit_output: &str) -> anyhow::Result<()> {
    log::info!("Generating synthetic benchmark ({nets} nets, pitch {pitch})...");

    let tech = generator::sample_tech();
    let circuit = generator::generate_random_circuit(nets, pitch);

    prepare_output_dir(tech_output)?;
    prepare_output_dir(circuit_output)?;

    let tech_toml = toml::to_string_pretty(&TechFixture::from(&tech))
        .map_err(|e| anyhow::anyhow!("Failed to serialize tech fixture: {e}"))?;
    std::fs::write(tech_output, tech_toml)?;

    let circuit_toml = toml::to_string_pretty(&CircuitFixture::from(&circuit))
        .map_err(|e| anyhow::anyhow!("Failed to serialize circuit fixture: {e}"))?;
    std::fs::write(circuit_output, circuit_toml)?;

    log::info!("Wrote {tech_output} and {circuit_output}");
    Ok(())
}

fn run_route(config: &Config, do_verify: bool) -> anyhow::Result<()> {
    let tech_path = &config.input.tech_file;
    let circuit_path = &config.input.circuit_file;

    if !Path::new(tech_path).exists() {
        return Err(anyhow::anyhow!(
            "Technology fixture missing: '{tech_path}'. Run 'generate' first."
        ));
    }
    if !Path::new(circuit_path).exists() {
        return Err(anyhow::anyhow!(
            "Circuit fixture missing: '{circuit_path}'. Run 'generate' first."
        ));
    }

    log::info!("Loading technology fixture: {tech_path}");
    let tech_str = std::fs::read_to_string(tech_path)?;
    let tech_fixture: TechFixture =
        toml::from_str(&tech_str).map_err(|e| anyhow::anyhow!("Invalid tech TOML in '{tech_path}': {e}"))?;
    let tech = tech_fixture.into();

    log::info!("Loading circuit fixture: {circuit_path}");
    let circuit_str = std::fs::read_to_string(circuit_path)?;
    let circuit_fixture: CircuitFixture =
        toml::from_str(&circuit_str).map_err(|e| anyhow::anyhow!("Invalid circuit TOML in '{circuit_path}': {e}"))?;
    let mut circuit = circuit_fixture.into();

    log::info!("Starting routing...");
    let report = icroute_router::maze_routing(
        &tech,
        &mut circuit,
        config.routing.routing_layers,
        config.routing.pitch_adjust_max,
        config.routing.grid_extension_pitches,
        config.routing.rdp_epsilon,
    )
    .map_err(|e| anyhow::anyhow!("Routing aborted: {e}"))?;

    icroute_router::port_placement(&mut circuit, config.routing.routing_layers);

    let routing_id = circuit
        .routing_group_id()
        .expect("routing group initialized by maze_routing");
    let routing_group = &circuit.groups[&routing_id];
    let shape_count: usize = routing_group.shapes.values().map(|v| v.len()).sum();
    log::info!(
        "Routing complete: {} shapes across {} layers ({} nets unrouted, {} nets open, {} short findings).",
        shape_count,
        routing_group.shapes.len(),
        report.unrouted_nets.len(),
        report.open_nets.len(),
        report.shorts.len(),
    );

    if do_verify && !report.is_clean() {
        return Err(anyhow::anyhow!(
            "--verify found problems: {} unrouted, {} open, {} shorted",
            report.unrouted_nets.len(),
            report.open_nets.len(),
            report.shorts.len(),
        ));
    }

    Ok(())
}
