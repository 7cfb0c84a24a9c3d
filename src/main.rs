//! carrier-stego - hide payloads in raw sample files.
//!
//! Input files are treated as flat 8-bit carriers. Media container parsing
//! is left to other tools; strip headers before embedding and restore them
//! afterwards.

use anyhow::{bail, Context, Result};
use carrier_stego::analysis;
use carrier_stego::codec::Codec;
use carrier_stego::config::{CodecConfig, Method, DEFAULT_HEADER_BITS};
use carrier_stego::payload::{self, PayloadOptions};
use carrier_stego::{Carrier, Framing, SampleBuffer, Seed};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "carrier-stego")]
#[command(author, version, long_about = None)]
#[command(about = "Hide and recover payloads in raw sample carriers")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how much a carrier can hold
    Capacity {
        /// Carrier file
        carrier: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Embed a payload into a carrier
    Embed {
        /// Carrier file
        carrier: PathBuf,

        /// Where to write the modified carrier
        #[arg(short, long)]
        output: PathBuf,

        /// Payload file
        #[arg(long, conflicts_with_all = ["data", "hex"])]
        input: Option<PathBuf>,

        /// Payload given as a string
        #[arg(long, conflicts_with_all = ["input", "hex"])]
        data: Option<String>,

        /// Payload given as hex
        #[arg(long, conflicts_with_all = ["input", "data"])]
        hex: Option<String>,

        /// Compress the payload when it helps
        #[arg(long)]
        compress: bool,

        /// Encrypt the payload with a password
        #[arg(long)]
        encrypt: bool,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Recover a payload from a carrier
    Extract {
        /// Carrier file
        carrier: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the payload as hex
        #[arg(long)]
        hex: bool,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Measure the distortion between a cover and a stego file
    Compare {
        /// Original carrier
        before: PathBuf,

        /// Modified carrier
        after: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Lsb,
    Vd,
}

#[derive(Clone, Copy, ValueEnum)]
enum FramingArg {
    Length,
    Delimiter,
    Raw,
}

/// Codec selection shared by every carrier command.
///
/// Flags override the values loaded from `--config`.
#[derive(Args)]
struct CodecArgs {
    /// JSON codec configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Embedding method
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Bits per element for LSB
    #[arg(long)]
    bits: Option<u8>,

    /// Bits of the first difference range for VD
    #[arg(long)]
    first_range_bits: Option<u8>,

    /// Ordering seed (integer or passphrase)
    #[arg(long)]
    seed: Option<String>,

    /// Message framing
    #[arg(long, value_enum)]
    framing: Option<FramingArg>,

    /// Length header width for length framing
    #[arg(long)]
    header_bits: Option<u8>,

    /// End marker for delimiter framing
    #[arg(long)]
    delimiter: Option<String>,
}

impl CodecArgs {
    fn resolve(&self) -> Result<CodecConfig> {
        let mut config = match &self.config {
            Some(path) => CodecConfig::load(path)
                .with_context(|| format!("loading codec config {}", path.display()))?,
            None => CodecConfig::default(),
        };

        if let Some(method) = self.method {
            config.method = match method {
                MethodArg::Lsb => Method::Lsb,
                MethodArg::Vd => Method::Vd,
            };
        }
        if let Some(bits) = self.bits {
            config.bits_per_element = bits;
        }
        if let Some(bits) = self.first_range_bits {
            config.first_range_bits = bits;
        }
        if let Some(seed) = &self.seed {
            config.seed = Some(Seed::parse(seed));
        }
        match self.framing {
            Some(FramingArg::Length) => {
                let header_bits = self.header_bits.unwrap_or(DEFAULT_HEADER_BITS);
                config.framing = Framing::length_prefix(header_bits);
            }
            Some(FramingArg::Delimiter) => {
                config.framing = match &self.delimiter {
                    Some(marker) => Framing::delimiter(marker.as_bytes().to_vec()),
                    None => Framing::default_delimiter(),
                }
            }
            Some(FramingArg::Raw) => config.framing = Framing::Raw,
            None => {}
        }

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid codec configuration: {}", e))?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Capacity { carrier, codec } => cmd_capacity(&carrier, &codec),

        Commands::Embed {
            carrier,
            output,
            input,
            data,
            hex,
            compress,
            encrypt,
            codec,
        } => {
            let content = read_payload(input, data, hex)?;
            cmd_embed(&carrier, &output, &content, compress, encrypt, &codec)
        }

        Commands::Extract {
            carrier,
            output,
            hex,
            codec,
        } => cmd_extract(&carrier, output, hex, &codec),

        Commands::Compare { before, after } => cmd_compare(&before, &after),
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).or_else(|_| -> Result<String> {
        eprint!("{}", prompt);
        io::stderr().flush()?;
        let mut password = String::new();
        io::stdin().read_line(&mut password)?;
        Ok(password.trim().to_string())
    })
}

fn load_carrier(path: &Path) -> Result<SampleBuffer<u8>> {
    SampleBuffer::read_file(path).with_context(|| format!("reading carrier {}", path.display()))
}

fn read_payload(
    input: Option<PathBuf>,
    data: Option<String>,
    hex: Option<String>,
) -> Result<Vec<u8>> {
    Ok(match (input, data, hex) {
        (Some(path), _, _) => {
            std::fs::read(&path).with_context(|| format!("reading payload {}", path.display()))?
        }
        (_, Some(s), _) => s.into_bytes(),
        (_, _, Some(h)) => hex::decode(h.trim()).context("payload is not valid hex")?,
        (None, None, None) => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    })
}

fn cmd_capacity(carrier_path: &Path, args: &CodecArgs) -> Result<()> {
    let carrier = load_carrier(carrier_path)?;
    let config = args.resolve()?;
    let codec = config.build()?;
    let capacity = codec.capacity(&carrier)?;
    let max_payload = capacity.max_payload_bytes(codec.framing());

    println!("Carrier Capacity");
    println!("================");
    println!("Carrier:          {}", carrier_path.display());
    println!("Elements:         {}", carrier.len());
    println!("Method:           {}", codec.name());
    println!("Capacity:         {} bits", capacity.total_bits);
    println!("Usable units:     {}", capacity.units);
    if capacity.skipped_units > 0 {
        println!("Skipped units:    {}", capacity.skipped_units);
    }
    println!("Framing overhead: {} bits", codec.framing().overhead_bits());
    println!(
        "Max payload:      {} bytes ({} before sealing)",
        max_payload,
        max_payload.saturating_sub(1)
    );

    Ok(())
}

fn cmd_embed(
    carrier_path: &Path,
    output: &Path,
    content: &[u8],
    compress: bool,
    encrypt: bool,
    args: &CodecArgs,
) -> Result<()> {
    let password = if encrypt {
        let password = prompt_password("Password: ")?;
        let confirm = prompt_password("Confirm password: ")?;
        if password != confirm {
            bail!("passwords do not match");
        }
        Some(password)
    } else {
        None
    };

    let sealed = payload::seal(content, &PayloadOptions { compress, password })?;
    let carrier = load_carrier(carrier_path)?;
    let codec = args.resolve()?.build()?;

    let stego = codec
        .embed(&carrier, &sealed)
        .with_context(|| format!("embedding {} bytes with {}", sealed.len(), codec.name()))?;
    stego
        .write_file(output)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Embedded {} bytes ({} sealed) into {}",
        content.len(),
        sealed.len(),
        output.display()
    );
    println!("PSNR: {:.2} dB", analysis::psnr(&carrier, &stego)?);

    Ok(())
}

fn cmd_extract(
    carrier_path: &Path,
    output: Option<PathBuf>,
    as_hex: bool,
    args: &CodecArgs,
) -> Result<()> {
    let carrier = load_carrier(carrier_path)?;
    let codec = args.resolve()?.build()?;
    let sealed = codec.extract(&carrier).context("no payload recovered")?;

    let password = if payload::is_encrypted(&sealed) {
        Some(prompt_password("Password: ")?)
    } else {
        None
    };
    let data = payload::open(&sealed, password.as_deref())?;

    match (output, as_hex) {
        (Some(path), _) => {
            let bytes = if as_hex {
                hex::encode(&data).into_bytes()
            } else {
                data.clone()
            };
            std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} bytes to {}", data.len(), path.display());
        }
        (None, true) => println!("{}", hex::encode(&data)),
        (None, false) => io::stdout().write_all(&data)?,
    }

    Ok(())
}

fn cmd_compare(before: &Path, after: &Path) -> Result<()> {
    let before = load_carrier(before)?;
    let after = load_carrier(after)?;

    println!("MSE:              {:.6}", analysis::mse(&before, &after)?);
    println!("PSNR:             {:.2} dB", analysis::psnr(&before, &after)?);
    println!(
        "Changed elements: {} of {}",
        analysis::changed_elements(&before, &after)?,
        before.len()
    );

    Ok(())
}
