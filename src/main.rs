use clap::{Arg, ArgAction, Command as ClapCommand};
use log::error;
use std::process;

use tiletiff::commands::{CommandFactory, TiletiffCommandFactory};
use tiletiff::utils::logger::Logger;

fn main() {
    let matches = ClapCommand::new("tiletiff")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plan and walk memory-mapped tiles of large N-dimensional TIFF files")
        .arg(
            Arg::new("input")
                .help("Input TIFF file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("tile-axes")
                .short('a')
                .long("tile-axes")
                .help("Comma-separated axes to tile over, negative values count from the end (default -2,-1)")
                .value_name("AXES")
                .allow_hyphen_values(true)
                .required(false),
        )
        .arg(
            Arg::new("channel-axis")
                .long("channel-axis")
                .help("Channel axis for per-channel normalization, or 'none'")
                .value_name("AXIS")
                .allow_hyphen_values(true)
                .required(false),
        )
        .arg(
            Arg::new("pixel-max")
                .short('p')
                .long("pixel-max")
                .help("Maximum number of elements per tile over the tiled axes (default 16e6)")
                .value_name("COUNT")
                .required(false),
        )
        .arg(
            Arg::new("overlap")
                .long("overlap")
                .help("Fraction of a tile shared with its neighbour, in [0, 1)")
                .value_name("FRACTION")
                .required(false),
        )
        .arg(
            Arg::new("scale-quantile")
                .long("scale-quantile")
                .help("Quantile used as the lower normalization bound (upper is 1 - q)")
                .value_name("Q")
                .required(false),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with a [tiling] table; flags override its values")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("stats")
                .short('s')
                .long("stats")
                .help("Read and normalize every tile, reporting min/mean/max")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("trim")
                .long("trim")
                .help("Clip normalized values to [0, 1]")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log records to this file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = Logger::level_for(matches.get_flag("verbose"));
    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            let file_level = level.to_level().unwrap_or(log::Level::Info);
            if let Err(e) = Logger::init_global_logger(log_file, file_level) {
                eprintln!("Error setting up global logger: {}", e);
                process::exit(1);
            }
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
                .init();
        }
    }

    let factory = TiletiffCommandFactory::new();

    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
