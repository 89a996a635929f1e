use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use code2llm::{
    collect_files, is_probably_binary, load_language_guidance, render, resolve_base,
    CollectOptions, ExcludeRules, ExclusionEngine, OutputOptions,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Collect code files into a single prompt for a language model, respecting gitignore and exclusion rules",
    long_about = None
)]
struct Args {
    /// Input files or directories. Can be specified multiple times.
    /// Defaults to the current directory.
    #[arg(short, long = "input")]
    input: Vec<String>,

    /// Exclude files under this path or prefix; they stay listed in the
    /// structure with an [x] marker. Can be specified multiple times.
    #[arg(short, long = "exclude")]
    exclude: Vec<String>,

    /// Exclude files whose absolute path matches this regex (soft)
    #[arg(long = "exclude-regex")]
    exclude_regex: Vec<String>,

    /// Exclude files whose path contains this substring (soft)
    #[arg(short = 'm', long = "exclude-match")]
    exclude_match: Vec<String>,

    /// Remove files under this path or prefix from the output entirely
    #[arg(short = 'E', long = "force-exclude")]
    force_exclude: Vec<String>,

    /// Remove files whose absolute path matches this regex entirely
    #[arg(long = "force-exclude-regex")]
    force_exclude_regex: Vec<String>,

    /// Remove files whose absolute path contains this substring entirely
    #[arg(short = 'M', long = "force-exclude-match")]
    force_exclude_match: Vec<String>,

    /// Omit the instructional preamble and language guidance
    #[arg(long)]
    no_prompt: bool,

    /// Omit the PROJECT STRUCTURE listing
    #[arg(long)]
    no_structure: bool,

    /// Print collection diagnostics to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn run(args: &Args) -> Result<String> {
    let input_args: Vec<String> = if args.input.is_empty() {
        vec![String::from(".")]
    } else {
        args.input.clone()
    };

    // A nonexistent input is the one fatal error; everything downstream
    // degrades per item instead of aborting.
    let inputs: Vec<PathBuf> = input_args
        .iter()
        .map(|raw| {
            fs::canonicalize(raw).with_context(|| format!("Cannot resolve input path '{raw}'"))
        })
        .collect::<Result<_>>()?;

    // Relative exclusion patterns resolve against every base directory.
    let mut bases: Vec<PathBuf> = Vec::new();
    for input in &inputs {
        let base = resolve_base(input);
        if !bases.contains(&base) {
            bases.push(base);
        }
    }

    let rules = ExcludeRules {
        exclude: args.exclude.clone(),
        exclude_regex: args.exclude_regex.clone(),
        exclude_match: args.exclude_match.clone(),
        force_exclude: args.force_exclude.clone(),
        force_exclude_regex: args.force_exclude_regex.clone(),
        force_exclude_match: args.force_exclude_match.clone(),
    };
    let engine = ExclusionEngine::new(&bases, &rules);

    let options = CollectOptions {
        verbose: args.verbose,
    };
    let mut files = collect_files(&inputs, &engine, options)?;

    // Binary pre-pass: a NUL byte in the first few KiB drops the file
    // before classification.
    files.retain(|file| {
        let keep = !is_probably_binary(&file.path);
        if !keep && args.verbose {
            eprintln!("DEBUG: Skipping binary file {}", file.path.display());
        }
        keep
    });

    let table = load_language_guidance()?;
    let output_options = OutputOptions {
        preamble: !args.no_prompt,
        structure: !args.no_structure,
    };

    Ok(render(&files, &engine, &table, output_options))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let output = run(&args)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(output.as_bytes())
        .context("Failed to write output")?;

    Ok(())
}
