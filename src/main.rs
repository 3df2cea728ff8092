use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use textpatch::{
    load_or_default, patch_from_text, patch_to_text, to_delta, Diff, EditResult, Engine,
    FileEdit, Operation, PatchInput, UnifiedPatch,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "textpatch")]
#[command(about = "Diff, patch and fuzzy-apply plain text", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace); TEXTPATCH_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the differences between two files
    Diff {
        old: PathBuf,
        new: PathBuf,

        /// Run a line-level pass first (faster on large inputs)
        #[arg(long)]
        lines: bool,

        #[arg(long, value_enum, default_value_t = Cleanup::Semantic)]
        cleanup: Cleanup,

        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// Write a patch that turns OLD into NEW
    Make {
        old: PathBuf,
        new: PathBuf,

        /// Emit a line-based unified diff instead of a char-level patch
        #[arg(short, long)]
        unified: bool,

        /// Write the patch here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a patch to a file, tolerating drift
    Apply {
        patch: PathBuf,
        target: PathBuf,

        /// The patch is a line-based unified diff
        #[arg(short, long)]
        unified: bool,

        /// Report what would happen without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Write the result here instead of over TARGET
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Cleanup {
    Semantic,
    Efficiency,
    None,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Colored inline rendering
    Pretty,
    Json,
    /// Tab-separated delta against OLD
    Delta,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let engine = Engine::new(load_or_default(cli.config.as_deref())?);

    match cli.command {
        Commands::Diff {
            old,
            new,
            lines,
            cleanup,
            format,
        } => cmd_diff(&engine, &old, &new, lines, cleanup, format),

        Commands::Make {
            old,
            new,
            unified,
            output,
        } => cmd_make(&engine, &old, &new, unified, output.as_deref()),

        Commands::Apply {
            patch,
            target,
            unified,
            dry_run,
            output,
        } => cmd_apply(&engine, &patch, &target, unified, dry_run, output.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("TEXTPATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("textpatch=debug"),
        _ => EnvFilter::new("textpatch=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn cmd_diff(
    engine: &Engine,
    old: &Path,
    new: &Path,
    lines: bool,
    cleanup: Cleanup,
    format: Format,
) -> Result<()> {
    let old_text = read(old)?;
    let new_text = read(new)?;

    let mut diffs = engine.diff_main(&old_text, &new_text, lines);
    diffs = match cleanup {
        Cleanup::Semantic => engine.cleanup_semantic(diffs),
        Cleanup::Efficiency => engine.cleanup_efficiency(diffs),
        Cleanup::None => diffs,
    };

    match format {
        Format::Pretty => print_pretty(&diffs),
        Format::Json => println!("{}", serde_json::to_string_pretty(&diffs)?),
        Format::Delta => println!("{}", to_delta(&diffs)),
    }
    Ok(())
}

/// Inline rendering: deletions struck through in red, insertions underlined
/// in green.
fn print_pretty(diffs: &[Diff]) {
    for diff in diffs {
        let text = match diff.op {
            Operation::Delete => diff.text.red().strikethrough(),
            Operation::Insert => diff.text.green().underline(),
            Operation::Equal => diff.text.normal(),
        };
        print!("{text}");
    }
    if !diffs.last().is_some_and(|d| d.text.ends_with('\n')) {
        println!();
    }
}

fn cmd_make(
    engine: &Engine,
    old: &Path,
    new: &Path,
    unified: bool,
    output: Option<&Path>,
) -> Result<()> {
    let old_text = read(old)?;
    let new_text = read(new)?;

    let patch_text = if unified {
        engine
            .unified_make(&old_text, &new_text)
            .with_paths(old.display().to_string(), new.display().to_string())
            .to_text()
    } else {
        patch_to_text(&engine.patch_make(PatchInput::Texts(&old_text, &new_text)))
    };

    match output {
        Some(path) => {
            let result = FileEdit::create(path, patch_text).apply()?;
            report_write(&result);
        }
        None => print!("{patch_text}"),
    }
    Ok(())
}

fn cmd_apply(
    engine: &Engine,
    patch: &Path,
    target: &Path,
    unified: bool,
    dry_run: bool,
    output: Option<&Path>,
) -> Result<()> {
    let patch_text = read(patch)?;
    let original = read(target)?;

    let (patched, results) = if unified {
        let parsed = UnifiedPatch::parse(&patch_text)
            .with_context(|| format!("invalid unified diff in {}", patch.display()))?;
        engine.unified_apply(&parsed, &original)
    } else {
        let parsed = patch_from_text(&patch_text)
            .with_context(|| format!("invalid patch in {}", patch.display()))?;
        engine.patch_apply(&parsed, &original)
    };

    if dry_run {
        println!("{}", "[DRY RUN - nothing will be written]".cyan());
    }
    for (idx, ok) in results.iter().enumerate() {
        if *ok {
            println!("{} hunk {}: applied", "✓".green(), idx + 1);
        } else {
            println!("{} hunk {}: failed", "✗".red(), idx + 1);
        }
    }

    let failed = results.iter().filter(|ok| !**ok).count();
    if !dry_run {
        let edit = match output {
            Some(path) => FileEdit::create(path, patched),
            None => FileEdit::new(target, &original, patched),
        };
        report_write(&edit.apply()?);
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", results.len() - failed).green());
    println!("  {} failed", format!("{failed}").red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn report_write(result: &EditResult) {
    match result {
        EditResult::Applied {
            file,
            bytes_written,
        } => eprintln!(
            "{} wrote {} ({} bytes)",
            "✓".green(),
            file.display(),
            bytes_written
        ),
        EditResult::Unchanged { file } => {
            eprintln!("{} {} already up to date", "⊙".yellow(), file.display())
        }
    }
}
