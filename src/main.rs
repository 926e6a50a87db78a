use anyhow::Result;
use clap::{Parser, Subcommand};
use classfix::{
    find_workspace_root, load_resolver, FileLister, FreshnessIndex, PhpParser, Psr4Resolver,
    Reconciler, SourceUnit, WorkspaceGuard,
};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = ".classfix-index.json";

#[derive(Parser)]
#[command(name = "classfix")]
#[command(about = "Fix PHP namespace and class-name declarations from PSR-4 paths", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply corrections to a file or tree
    Fix {
        /// File or directory to fix (defaults to the whole workspace)
        path: Option<PathBuf>,

        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Revisit every file, ignoring the freshness index
        #[arg(long)]
        all: bool,

        /// Glob patterns of files to include (workspace-relative)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns of files to exclude (workspace-relative)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Report mismatches without modifying files
    Check {
        /// File or directory to check (defaults to the whole workspace)
        path: Option<PathBuf>,

        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Revisit every file, ignoring the freshness index
        #[arg(long)]
        all: bool,

        /// Glob patterns of files to include (workspace-relative)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns of files to exclude (workspace-relative)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// List the PSR-4 autoload roots the resolver uses
    Roots {
        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fix {
            path,
            workspace,
            dry_run,
            diff,
            all,
            include,
            exclude,
        } => cmd_fix(path, workspace, dry_run, diff, all, &include, &exclude),

        Commands::Check {
            path,
            workspace,
            all,
            include,
            exclude,
        } => cmd_check(path, workspace, all, &include, &exclude),

        Commands::Roots { workspace } => cmd_roots(workspace),
    }
}

/// Resolve the workspace root: explicit flag first, then ancestor search
/// for composer.json from the current directory.
fn resolve_workspace(cli_workspace: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_workspace {
        return Ok(path.canonicalize()?);
    }

    let current = env::current_dir()?;
    if let Some(root) = find_workspace_root(&current) {
        println!(
            "{}",
            format!("Auto-detected workspace: {}", root.display()).dimmed()
        );
        return Ok(root.canonicalize()?);
    }

    anyhow::bail!(
        "{}\n{}\n  {}\n  {}",
        "Could not find a composer.json workspace.".red(),
        "Try one of:".bold(),
        "1. cd into your project: cd /path/to/project && classfix fix",
        "2. Specify explicitly: classfix fix --workspace /path/to/project"
    )
}

fn build_reconciler(workspace: &Path) -> Result<Reconciler<Psr4Resolver>> {
    let resolver = load_resolver(workspace)?;
    Ok(Reconciler::new(resolver, PhpParser::new()?))
}

/// Collect the files a command should visit, consulting the freshness
/// index unless `--all` or an explicit sub-path was given.
fn collect_files(
    workspace: &Path,
    sub_path: Option<&Path>,
    all: bool,
    include: &[String],
    exclude: &[String],
    index: &FreshnessIndex,
) -> Result<Vec<PathBuf>> {
    let lister = FileLister::new(include, exclude)?;
    let files = lister.provide(workspace, sub_path, |path| !all && index.is_fresh(path))?;
    Ok(files)
}

/// Show unified diff between original and corrected content.
fn display_diff(file: &Path, original: &str, corrected: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, corrected);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_fix(
    sub_path: Option<PathBuf>,
    workspace: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
    all: bool,
    include: &[String],
    exclude: &[String],
) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let guard = WorkspaceGuard::new(&workspace)?;
    let mut reconciler = build_reconciler(&workspace)?;

    let index_path = workspace.join(INDEX_FILE);
    let mut index = FreshnessIndex::load(&index_path)?;

    let files = collect_files(
        &workspace,
        sub_path.as_deref(),
        all,
        include,
        exclude,
        &index,
    )?;

    if dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
    }

    let mut fixed = 0;
    let mut clean = 0;
    let mut failed = 0;

    for file in &files {
        let text = fs::read_to_string(file)?;
        let unit = SourceUnit::php_at(text, file.clone());

        let edits = match reconciler.reconcile(&unit) {
            Ok(edits) => edits,
            Err(err) => {
                eprintln!("{}", format!("  {} ({err})", file.display()).yellow());
                failed += 1;
                continue;
            }
        };

        if edits.is_empty() {
            clean += 1;
            index.record(file)?;
            continue;
        }

        if show_diff || dry_run {
            let corrected = edits.apply(unit.text())?;
            display_diff(file, unit.text(), &corrected);
        }

        if dry_run {
            fixed += 1;
            continue;
        }

        let target = guard.validate_path(file)?;
        edits.apply_to_file(&target)?;
        index.record(file)?;
        println!(
            "{}",
            format!("  fixed {} ({} edits)", file.display(), edits.len()).green()
        );
        fixed += 1;
    }

    if !dry_run {
        index.save(&index_path)?;
    }

    println!();
    println!(
        "{} fixed, {} already correct, {} skipped",
        fixed, clean, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(
    sub_path: Option<PathBuf>,
    workspace: Option<PathBuf>,
    all: bool,
    include: &[String],
    exclude: &[String],
) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let mut reconciler = build_reconciler(&workspace)?;

    let index_path = workspace.join(INDEX_FILE);
    let mut index = FreshnessIndex::load(&index_path)?;

    let files = collect_files(
        &workspace,
        sub_path.as_deref(),
        all,
        include,
        exclude,
        &index,
    )?;

    let mut findings = 0;

    for file in &files {
        let text = fs::read_to_string(file)?;
        let unit = SourceUnit::php_at(text, file.clone());

        let diagnostics = reconciler.inspect(&unit);
        if diagnostics.is_empty() {
            index.record(file)?;
            continue;
        }

        for diagnostic in &diagnostics {
            let label = match diagnostic.severity {
                classfix::Severity::Warning => "warning:".yellow().bold(),
                classfix::Severity::Error => "error:".red().bold(),
            };
            println!("{}: {} {}", file.display(), label, diagnostic.message);
            findings += 1;
        }
    }

    index.save(&index_path)?;

    if findings > 0 {
        println!();
        println!("{} mismatch(es) found", findings);
        std::process::exit(1);
    }

    println!("{}", "No mismatches found".green());
    Ok(())
}

fn cmd_roots(workspace: Option<PathBuf>) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let resolver = load_resolver(&workspace)?;

    for mapping in resolver.mappings() {
        let prefix = if mapping.prefix.is_empty() {
            "(global)".to_string()
        } else {
            format!("{}\\", mapping.prefix)
        };
        println!("{prefix} -> {}", mapping.dir.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_fix_flags() {
        let cli = Cli::try_parse_from([
            "classfix",
            "fix",
            "src/Model",
            "--dry-run",
            "--diff",
            "--exclude",
            "vendor/**",
        ])
        .unwrap();

        match cli.command {
            Commands::Fix {
                path,
                dry_run,
                diff,
                exclude,
                ..
            } => {
                assert_eq!(path, Some(PathBuf::from("src/Model")));
                assert!(dry_run);
                assert!(diff);
                assert_eq!(exclude, vec!["vendor/**".to_string()]);
            }
            _ => panic!("expected fix command"),
        }
    }

    #[test]
    fn cli_parses_check_defaults() {
        let cli = Cli::try_parse_from(["classfix", "check"]).unwrap();
        match cli.command {
            Commands::Check { path, all, .. } => {
                assert_eq!(path, None);
                assert!(!all);
            }
            _ => panic!("expected check command"),
        }
    }
}
