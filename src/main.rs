//! Density Life CLI - Run simulations from JSON configuration.

use std::path::PathBuf;

use density_life::{SimulationConfig, SimulationState, SimulationStats};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [generations] [--json]", args[0]);
        eprintln!();
        eprintln!("Run Density Life simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  generations  Override the configured generation count");
        eprintln!("  --json       Print the final grid report as JSON");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let json_output = args.iter().any(|a| a == "--json");
    let config_path = PathBuf::from(&args[1]);

    let mut config = SimulationConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });
    if let Some(generations) = args.get(2).and_then(|s| s.parse().ok()) {
        config.generations = generations;
    }

    println!("Density Life Simulation");
    println!("=======================");
    println!("Grid: {}x{}", config.width, config.height);
    println!("Initial population: {}", config.population);
    println!(
        "Generations: {} x {} steps ({:?})",
        config.generations, config.steps_per_generation, config.step_mode
    );
    println!();

    let mut state = SimulationState::initialize(config).unwrap_or_else(|e| {
        eprintln!("Error initializing simulation: {}", e);
        std::process::exit(1);
    });
    println!("Seed: {}", state.seed());
    println!();

    let summary = state
        .run_with_callback(|report| {
            println!("Generation {}", report.generation);
            println!(
                "    Population size: {} (+{} born, -{} died)",
                report.population_size, report.births, report.deaths
            );
        })
        .unwrap_or_else(|e| {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        });

    let stats = SimulationStats::from_state(&state);

    println!();
    println!("Final state:");
    println!("  Population: {}", stats.population);
    println!("  Occupied cells: {}", stats.occupied_cells);
    println!("  Max occupancy: {}", stats.max_occupancy);
    println!("  Genome diversity: {:.4}", stats.diversity);
    println!(
        "Time: {:.2}s ({} generations)",
        summary.elapsed_seconds, summary.generations
    );

    if json_output {
        match serde_json::to_string(&state.report()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing report: {}", e),
        }
    }
}

fn print_example_config() {
    let config = SimulationConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
