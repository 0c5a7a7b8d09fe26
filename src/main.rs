use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pack_patcher::{fixed_output_path, patch_file, scan_file, Patcher, Signature};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "pack-patcher")]
#[command(about = "Restore standard ZIP magics in GBMP pack archives", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch a file, or every matching file in a directory
    Apply {
        /// Input archive, or a directory to patch file-by-file
        input: PathBuf,

        /// Output path (default: input with `_fixed` appended to the stem)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Signature to search for (text, or 0x-prefixed hex)
        #[arg(long, default_value = "GBMP")]
        source: Signature,

        /// Signature to substitute (text, or 0x-prefixed hex)
        #[arg(long, default_value = "0x504b0304")]
        target: Signature,

        /// File extension to patch in directory mode
        #[arg(long, default_value = "bin")]
        ext: String,

        /// Dry run - count occurrences without writing any output
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Count occurrences and list their offsets without writing anything
    Scan {
        /// Input archive
        input: PathBuf,

        /// Signature to search for (text, or 0x-prefixed hex)
        #[arg(long, default_value = "GBMP")]
        source: Signature,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            input,
            output,
            source,
            target,
            ext,
            dry_run,
        } => cmd_apply(input, output, source, target, &ext, dry_run),

        Commands::Scan { input, source } => cmd_scan(&input, &source),
    }
}

fn cmd_apply(
    input: PathBuf,
    output: Option<PathBuf>,
    source: Signature,
    target: Signature,
    ext: &str,
    dry_run: bool,
) -> Result<()> {
    let patcher = Patcher::new(source, target);

    if input.is_dir() {
        if output.is_some() {
            anyhow::bail!("--output cannot be used when INPUT is a directory");
        }
        return cmd_apply_dir(&input, &patcher, ext, dry_run);
    }

    if dry_run {
        println!("{}", "[DRY RUN - no output written]".cyan());
    }

    let output = output.unwrap_or_else(|| fixed_output_path(&input));
    let replacements = apply_one(&input, &output, &patcher, dry_run)?;
    report_replacements(replacements);

    Ok(())
}

/// Apply or, on a dry run, only count.
fn apply_one(input: &Path, output: &Path, patcher: &Patcher, dry_run: bool) -> Result<usize> {
    if dry_run {
        let offsets = scan_file(input, patcher.source())?;
        return Ok(offsets.len());
    }

    let report = patch_file(input, output, patcher)?;
    Ok(report.replacements)
}

/// The report lines of the original fix-up script, kept verbatim.
fn report_replacements(count: usize) {
    if count > 0 {
        println!(
            "{}",
            format!("Header found and replaced {count} times.").green()
        );
    } else {
        println!("{}", "Header not found, no replacements made.".yellow());
    }
}

fn cmd_apply_dir(dir: &Path, patcher: &Patcher, ext: &str, dry_run: bool) -> Result<()> {
    let archives = discover_archives(dir, ext)?;

    if archives.is_empty() {
        anyhow::bail!("no .{} files found in {}", ext, dir.display());
    }

    if dry_run {
        println!("{}", "[DRY RUN - no output written]".cyan());
    }

    let mut patched = 0;
    let mut untouched = 0;
    let mut failed = 0;

    for archive in archives {
        let output = fixed_output_path(&archive);
        match apply_one(&archive, &output, patcher, dry_run) {
            Ok(count) if count > 0 => {
                println!(
                    "{} {}: Header found and replaced {} times.",
                    "✓".green(),
                    archive.display(),
                    count
                );
                patched += 1;
            }
            Ok(_) => {
                println!(
                    "{} {}: Header not found, no replacements made.",
                    "⊙".yellow(),
                    archive.display()
                );
                untouched += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), archive.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} patched", format!("{patched}").green());
    println!("  {} untouched", format!("{untouched}").yellow());
    println!("  {} failed", format!("{failed}").red());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Discover patchable archives directly inside `dir` (no recursion), sorted
/// for a stable report order. Outputs of a previous run (`*_fixed`) are
/// skipped so re-running on the same directory does not patch its own output.
fn discover_archives(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some(ext) {
            continue;
        }
        let already_fixed = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with("_fixed"));
        if already_fixed {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn cmd_scan(input: &Path, source: &Signature) -> Result<()> {
    let offsets = scan_file(input, source)?;

    println!("{}", "Scan Report".bold());
    println!("File: {}", input.display());
    println!("Signature: {}", source);
    println!();

    if offsets.is_empty() {
        println!("{}", "No occurrences found.".yellow());
        return Ok(());
    }

    println!(
        "{} {} ({} occurrences)",
        "✓".green(),
        "FOUND".green().bold(),
        offsets.len()
    );
    for offset in &offsets {
        println!("  - {offset:#010x}");
    }

    Ok(())
}
