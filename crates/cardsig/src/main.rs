#![forbid(unsafe_code)]

//! cardsig CLI: exclusive canonicalization, transform chains and reference
//! digest checks.

use base64::Engine;
use cardsig_c14n::CanonicalizationMode;
use cardsig_core::{algorithm, Error};
use cardsig_dsig::{ReferenceContext, VerifyResult};
use cardsig_transforms::TransformChain;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for data errors and failed reference checks.
const EXIT_FAILURE: i32 = 1;
/// Exit code when this build cannot canonicalize at all.
const EXIT_UNAVAILABLE: i32 = 3;

#[derive(Parser)]
#[command(
    name = "cardsig",
    about = "Exclusive XML canonicalization and transform chains for InfoCard signatures",
    version
)]
struct Cli {
    /// Log processing steps to stderr (filter with RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize an XML file with exclusive C14N
    C14n {
        /// Input XML file
        file: PathBuf,

        /// Keep comment nodes
        #[arg(long = "with-comments")]
        with_comments: bool,

        /// InclusiveNamespaces prefix (repeatable, `#default` for the default namespace)
        #[arg(long = "prefix")]
        prefix: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a chain of transforms over an XML file
    Transform {
        /// Input XML file
        file: PathBuf,

        /// Transform algorithm URI, applied in order
        #[arg(short = 't', long = "transform", required = true)]
        transform: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the base64 digest of a file after optional transforms
    Digest {
        /// Input file
        file: PathBuf,

        /// Digest algorithm name (sha1, sha256, ...) or URI
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,

        /// Transform algorithm URI, applied in order before digesting
        #[arg(short = 't', long = "transform")]
        transform: Vec<String>,
    },

    /// Check the reference digests of a signed document
    CheckRefs {
        /// Input XML file
        file: PathBuf,

        /// Register additional ID attribute names
        #[arg(long = "id-attr")]
        id_attr: Vec<String>,
    },

    /// Show supported algorithms
    Info,
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        init_logging();
    }

    let result = match cli.command {
        Commands::C14n {
            file,
            with_comments,
            prefix,
            output,
        } => cmd_c14n(&file, with_comments, &prefix, output),
        Commands::Transform {
            file,
            transform,
            output,
        } => cmd_transform(&file, &transform, output),
        Commands::Digest {
            file,
            algorithm,
            transform,
        } => cmd_digest(&file, &algorithm, &transform),
        Commands::CheckRefs { file, id_attr } => cmd_check_refs(&file, &id_attr),
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if e.is_environment_fault() {
            process::exit(EXIT_UNAVAILABLE);
        }
        process::exit(EXIT_FAILURE);
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cardsig=debug,cardsig_c14n=debug,cardsig_transforms=debug,cardsig_dsig=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_c14n(
    file: &Path,
    with_comments: bool,
    prefixes: &[String],
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let data = read_file(file)?;
    let xml = cardsig_xml::decode_input(&data)?;
    let mode = if with_comments {
        CanonicalizationMode::ExclusiveWithComments
    } else {
        CanonicalizationMode::Exclusive
    };
    tracing::info!(file = %file.display(), mode = mode.uri(), "canonicalizing");
    let out = cardsig_c14n::canonicalize(xml, mode, None, prefixes)?;
    write_output(output, &out)
}

fn cmd_transform(file: &Path, uris: &[String], output: Option<PathBuf>) -> Result<(), Error> {
    let data = read_file(file)?;
    let chain = TransformChain::from_uris(uris)?;
    tracing::info!(file = %file.display(), steps = chain.len(), "running transform chain");
    let out = chain.apply(&data)?;
    write_output(output, &out)
}

fn cmd_digest(file: &Path, name: &str, uris: &[String]) -> Result<(), Error> {
    let data = read_file(file)?;
    let digest_uri = algorithm::digest_uri_from_name(name).unwrap_or(name);
    let chain = TransformChain::from_uris(uris)?;
    let input = if chain.is_empty() {
        data
    } else {
        chain.apply(&data)?
    };
    let value = cardsig_crypto::digest(digest_uri, &input)?;
    println!("{}", base64::engine::general_purpose::STANDARD.encode(value));
    Ok(())
}

fn cmd_check_refs(file: &Path, id_attrs: &[String]) -> Result<(), Error> {
    let data = read_file(file)?;
    let xml = cardsig_xml::decode_input(&data)?;

    let mut ctx = ReferenceContext::new();
    for attr in id_attrs {
        ctx.add_id_attr(attr);
    }

    tracing::info!(file = %file.display(), "checking reference digests");
    match cardsig_dsig::verify_references(&ctx, xml)? {
        VerifyResult::Valid => {
            println!("OK");
            Ok(())
        }
        VerifyResult::Invalid { reason } => {
            println!("INVALID: {reason}");
            process::exit(EXIT_FAILURE);
        }
    }
}

fn cmd_info() -> Result<(), Error> {
    println!("cardsig: exclusive XML canonicalization for InfoCard signatures");
    println!();
    println!("Canonicalization available: {}", cardsig_c14n::is_available());
    println!();
    println!("Supported digest algorithms:");
    println!("  SHA-1, SHA-224, SHA-256, SHA-384, SHA-512");
    println!("  SHA3-224, SHA3-256, SHA3-384, SHA3-512");
    println!();
    println!("Supported transforms:");
    for uri in cardsig_transforms::registry::SUPPORTED_URIS {
        println!("  {uri}");
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(&p, data).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", p.display()),
            ))
        }),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(data)?;
            Ok(())
        }
    }
}
