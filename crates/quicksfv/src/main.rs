//! `quicksfv` command line front end.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use quicksfv_digest::{AlgorithmId, digest_reader};
use quicksfv_engine::{
    CancellationToken, DEFAULT_CHUNK_SIZE, DirectoryResolver, Engine, FileResolver, ManifestSource,
    ResultSink, VerificationResult, VerifyOptions, ZipPayloadResolver,
};
use quicksfv_manifest::{
    ManifestEntry, ManifestFormat, ParseOptions, normalize_entry_path, parse_file, render_hash_list,
    render_sfv,
};
use quicksfv_registry::ProviderRegistry;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quicksfv", about = "Checksum manifest verification", version)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify files against a manifest (.sfv, .sha1, .sha256, .md5 or .zip)
    Verify(VerifyArgs),
    /// Print a manifest for the given files
    Hash(HashArgs),
}

#[derive(Args, Debug)]
struct VerifyArgs {
    manifest: PathBuf,

    /// Directory manifest paths are relative to (default: the manifest's directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Worker threads (default: available parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Bytes read per update
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Skip malformed manifest lines instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Only print entries that did not match
    #[arg(short, long)]
    quiet: bool,

    #[command(flatten)]
    plugins: PluginArgs,
}

#[derive(Args, Debug)]
struct HashArgs {
    /// Files to hash; `-` reads standard input
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(short, long, default_value = "crc32")]
    algorithm: String,

    #[command(flatten)]
    plugins: PluginArgs,
}

#[derive(Args, Debug)]
struct PluginArgs {
    /// Load an algorithm provider from a shared library (repeatable)
    #[arg(long = "plugin", value_name = "PATH")]
    paths: Vec<PathBuf>,
}

impl PluginArgs {
    fn registry(&self) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::with_builtins();
        for path in &self.paths {
            let id = registry
                .load_library(path)
                .with_context(|| format!("loading plugin {}", path.display()))?;
            tracing::info!(plugin = %path.display(), algorithm = %id, "plugin loaded");
        }
        Ok(registry)
    }
}

fn initialize_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    initialize_tracing(cli.verbose);

    match cli.command {
        Command::Verify(args) => verify_command(args),
        Command::Hash(args) => hash_command(args),
    }
}

/// Prints one line per finished entry.
struct ConsoleSink {
    quiet: bool,
}

impl ResultSink for ConsoleSink {
    fn on_result(&self, result: &VerificationResult) {
        if self.quiet && result.outcome.is_match() {
            return;
        }
        println!("{}", result_line(result));
    }
}

fn result_line(result: &VerificationResult) -> String {
    let mut line = format!("{}: {}", result.path, result.outcome);
    if let Some(computed) = result.computed.as_ref().filter(|_| !result.outcome.is_match()) {
        line.push_str(&format!(" (expected {}, got {})", result.expected, computed));
    }
    if let Some(error) = &result.error {
        line.push_str(&format!(" ({error})"));
    }
    line
}

fn verify_command(args: VerifyArgs) -> Result<ExitCode> {
    let registry = args.plugins.registry()?;
    let mut options = VerifyOptions::default().chunk_size(args.chunk_size);
    if let Some(jobs) = args.jobs {
        options = options.workers(jobs);
    }
    if args.skip_malformed {
        options = options.parse(ParseOptions::skip_malformed());
    }

    let parsed = parse_file(&args.manifest, &options.parse)
        .with_context(|| format!("reading manifest {}", args.manifest.display()))?;
    for diagnostic in &parsed.diagnostics {
        eprintln!("skipped line {}: {}", diagnostic.line, diagnostic.reason);
    }

    let resolver = resolver_for(&args.manifest, &parsed.format, args.base_dir.as_deref())?;
    let engine = Engine::new(&registry, options);
    let report = engine.run(
        ManifestSource::Entries(&parsed.entries),
        resolver.as_ref(),
        &ConsoleSink { quiet: args.quiet },
        &CancellationToken::new(),
    )?;

    let c = &report.counters;
    eprintln!(
        "{} entries: {} ok, {} mismatched, {} missing, {} unreadable, {} unsupported",
        report.results.len(),
        c.matched,
        c.mismatched,
        c.missing,
        c.errored,
        c.unsupported
    );
    Ok(if report.all_matched() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn resolver_for(
    manifest: &Path,
    format: &ManifestFormat,
    base_dir: Option<&Path>,
) -> Result<Box<dyn FileResolver>> {
    if *format == ManifestFormat::Zip {
        if base_dir.is_some() {
            bail!("--base-dir has no effect on archive manifests");
        }
        let resolver = ZipPayloadResolver::new(manifest)
            .with_context(|| format!("indexing archive {}", manifest.display()))?;
        return Ok(Box::new(resolver));
    }

    let root = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => manifest
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    };
    Ok(Box::new(DirectoryResolver::new(root)))
}

fn hash_command(args: HashArgs) -> Result<ExitCode> {
    let registry = args.plugins.registry()?;
    let algorithm = AlgorithmId::new(&args.algorithm);

    if args.files.iter().filter(|path| is_stdin(path)).count() > 1 {
        bail!("standard input can only be hashed once");
    }

    let mut entries = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let entry = if is_stdin(path) {
            hash_input(&registry, &algorithm, path, io::stdin().lock())?
        } else {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            hash_input(&registry, &algorithm, path, BufReader::new(file))?
        };
        entries.push(entry);
    }

    let text = if algorithm == AlgorithmId::CRC32 {
        render_sfv(&entries)
    } else {
        render_hash_list(&entries)
    };
    io::stdout().lock().write_all(text.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

fn is_stdin(path: &Path) -> bool { path.as_os_str() == "-" }

fn hash_input(
    registry: &ProviderRegistry,
    algorithm: &AlgorithmId,
    path: &Path,
    reader: impl Read,
) -> Result<ManifestEntry> {
    let provider = registry.create(algorithm)?;
    let value =
        digest_reader(reader, provider).with_context(|| format!("hashing {}", path.display()))?;
    let name = normalize_entry_path(&path.to_string_lossy())
        .with_context(|| format!("unusable path {}", path.display()))?;
    Ok(ManifestEntry::new(name, value, algorithm.clone()))
}
