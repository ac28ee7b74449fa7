use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use key_exchange::{DEFAULT_ROUNDS, Dh, DhParameters, SearchConfig, cli, files, logging};

/// DHE: Diffie-Hellman Parameter und Schlüsselpaare erzeugen
#[derive(Parser)]
#[command(name = "dhe")]
#[command(about = "Generates Diffie-Hellman parameters and key pairs")]
#[command(version, arg_required_else_help = true)]
struct Args {
    /// Miller-Rabin rounds for prime search and parameter validation
    #[arg(short = 'r', long = "rounds", default_value_t = DEFAULT_ROUNDS, global = true)]
    rounds: usize,

    /// Give up the safe-prime search after this many candidates
    #[arg(long = "max-attempts", value_name = "N", global = true)]
    max_attempts: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate DHE parameters and save to file
    Generate {
        /// Output file for the parameters
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Bit length of the prime p
        #[arg(value_name = "BIT_LENGTH")]
        bit_length: u64,

        /// Weitere Argumente werden ignoriert
        #[arg(hide = true, num_args = 0..)]
        ignored: Vec<String>,
    },
    /// Load DHE parameters from file and generate keys
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
        SearchConfig::default()
            .with_rounds(self.rounds)
            .with_max_attempts(self.max_attempts)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    // Falsche Eingaben: Hilfe ausgeben, Exit-Code 0
    let Some(args) = cli::parse_or_usage::<Args>() else {
        return Ok(());
    };

    let config = args.search_config();
    let mut rng = rand::thread_rng();

    match args.command {
        Command::Generate { file, bit_length, .. } => {
            let params = DhParameters::generate(bit_length, &config, &mut rng)?;
            files::save_parameters::<Dh>(&file, &params)?;
            println!("Parameters saved to {}", file.display());
        }
        Command::Load {
            file,
            private_output,
            public_output,
            ..
        } => {
            println!("Loading parameters from {}", file.display());
            files::load_parameters_and_generate_keys::<Dh, _>(
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
