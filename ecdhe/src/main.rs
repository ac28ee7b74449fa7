use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use key_exchange::{CurveId, DEFAULT_ROUNDS, EcParameters, Ecdh, SearchConfig, cli, files, logging};

/// ECDHE: Parameter für benannte Kurven und Schlüsselpaare erzeugen
#[derive(Parser)]
#[command(name = "ecdhe")]
#[command(about = "Generates elliptic-curve Diffie-Hellman parameters and key pairs")]
#[command(version, arg_required_else_help = true)]
struct Args {
    /// Miller-Rabin rounds used when checking loaded parameters
    #[arg(short = 'r', long = "rounds", default_value_t = DEFAULT_ROUNDS, global = true)]
    rounds: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate ECDHE parameters and save to file
    Generate {
        /// Output file for the parameters
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Named curve written to the parameter file
        #[arg(long, value_enum, default_value_t = CurveId::Secp256r1)]
        curve: CurveId,

        /// Extra arguments (such as a bit length) are ignored
        #[arg(hide = true, num_args = 0..)]
        ignored: Vec<String>,
    },
    /// Load ECDHE parameters from file and generate keys
    Load {
        /// Parameter file written by `generate`
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file for the private key
        #[arg(value_name = "PRIVATE_OUTPUT_FILE")]
        private_output: PathBuf,

        /// Output file for the public key
        #[arg(value_name = "PUBLIC_OUTPUT_FILE")]
        public_output: PathBuf,

        #[arg(hide = true, num_args = 0..)]
        ignored: Vec<String>,
    },
}

impl Args {
    fn search_config(&self) -> SearchConfig {
        SearchConfig::default().with_rounds(self.rounds)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let Some(args) = cli::parse_or_usage::<Args>() else {
        return Ok(());
    };

    let config = args.search_config();
    let mut rng = rand::thread_rng();

    match args.command {
        Command::Generate { file, curve, .. } => {
            files::save_parameters::<Ecdh>(&file, &EcParameters::named(curve))?;
            println!("Parameters saved to {}", file.display());
        }
        Command::Load {
            file,
            private_output,
            public_output,
            ..
        } => {
            println!("Loading parameters from {}", file.display());
            files::load_parameters_and_generate_keys::<Ecdh, _>(
                &file,
                &private_output,
                &public_output,
                &config,
                &mut rng,
            )?;
        }
    }

    Ok(())
}
