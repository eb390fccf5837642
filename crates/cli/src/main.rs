use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;
use rayon::prelude::*;
use read_fonts::FontRef;

use crosstype_convert::{Converter, Options, SourceFormat, TableSource, TargetFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    /// TrueType outlines (glyf/loca)
    Ttf,
    /// OpenType CFF outlines
    Otf,
}

impl From<Target> for TargetFormat {
    fn from(target: Target) -> Self {
        match target {
            Target::Ttf => TargetFormat::Ttf,
            Target::Otf => TargetFormat::Otf,
        }
    }
}

#[derive(Parser)]
#[command(name = "crosstype", version)]
#[command(about = "Convert fonts between TrueType and CFF outline formats")]
struct Cli {
    /// Input font files
    inputs: Vec<PathBuf>,

    /// Target outline format
    #[arg(long, value_enum)]
    to: Option<Target>,

    /// Output file (single input only; default: INPUT with the new extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory for batch conversion
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Run the CFF subroutinizer on the generated CharStrings
    #[arg(long)]
    optimize_cff: bool,

    /// Minimum repeated-pattern length for the subroutinizer
    #[arg(long, default_value_t = 10)]
    min_pattern_length: usize,

    /// Maximum number of subroutines to emit
    #[arg(long, default_value_t = 65535)]
    max_subrs: usize,

    /// Allow extraction of patterns with a non-zero stack effect
    #[arg(long)]
    no_stack_aware: bool,

    /// Attempt hint preservation (requires a hint translator)
    #[arg(long)]
    preserve_hints: bool,

    /// Drop variation tables from the output
    #[arg(long)]
    no_variations: bool,

    /// Show the detected format and table list, then exit
    #[arg(long)]
    info: bool,

    /// Quiet output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.inputs.is_empty() {
        eprintln!("Error: no input files");
        return ExitCode::FAILURE;
    }

    if cli.info {
        return show_info(&cli.inputs);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(target) = cli.to else {
        bail!("--to is required (ttf or otf)");
    };
    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output only works with a single input; use --out-dir for batches");
    }

    let options = Options::new()
        .optimize_cff(cli.optimize_cff)
        .min_pattern_length(cli.min_pattern_length)
        .max_subroutines(cli.max_subrs)
        .stack_aware(!cli.no_stack_aware)
        .preserve_hints(cli.preserve_hints)
        .preserve_variations(!cli.no_variations);
    let converter = Converter::new(options);

    let results: Vec<(PathBuf, Result<()>)> = cli
        .inputs
        .par_iter()
        .map(|input| {
            let result = convert_one(&converter, input, target, &cli);
            (input.clone(), result)
        })
        .collect();

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    for (input, result) in &results {
        if let Err(e) = result {
            eprintln!("{}: {e:#}", input.display());
        }
    }
    if !cli.quiet {
        println!("{} converted, {failed} failed", results.len() - failed);
    }
    if failed > 0 {
        bail!("{failed} of {} conversions failed", results.len());
    }
    Ok(())
}

fn convert_one(converter: &Converter, input: &Path, target: Target, cli: &Cli) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let converted = converter
        .convert_to_font(&data, target.into())
        .with_context(|| format!("converting {}", input.display()))?;

    let output = output_path(input, target, cli);
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, converted).with_context(|| format!("writing {}", output.display()))?;
    info!("{} -> {}", input.display(), output.display());
    if !cli.quiet {
        println!("Wrote {}", output.display());
    }
    Ok(())
}

fn output_path(input: &Path, target: Target, cli: &Cli) -> PathBuf {
    if let Some(output) = &cli.output {
        return output.clone();
    }
    let extension = match target {
        Target::Ttf => "ttf",
        Target::Otf => "otf",
    };
    let file = input.with_extension(extension);
    match &cli.out_dir {
        Some(dir) => dir.join(file.file_name().unwrap_or(file.as_os_str())),
        None => file,
    }
}

fn show_info(inputs: &[PathBuf]) -> ExitCode {
    let mut status = ExitCode::SUCCESS;
    for input in inputs {
        let data = match fs::read(input) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{}: {e}", input.display());
                status = ExitCode::FAILURE;
                continue;
            }
        };
        let font = match FontRef::new(&data) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("{}: not a font: {e}", input.display());
                status = ExitCode::FAILURE;
                continue;
            }
        };
        let format = SourceFormat::detect(&font)
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let tags: Vec<String> = TableSource::tags(&font).iter().map(|t| t.to_string()).collect();
        println!("{}: {format} ({} tables)", input.display(), tags.len());
        println!("  {}", tags.join(" "));
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_swaps_extension() {
        let cli = Cli::parse_from(["crosstype", "font.ttf", "--to", "otf"]);
        let path = output_path(Path::new("fonts/font.ttf"), Target::Otf, &cli);
        assert_eq!(path, PathBuf::from("fonts/font.otf"));
    }

    #[test]
    fn output_path_honors_out_dir() {
        let cli = Cli::parse_from(["crosstype", "a.otf", "--to", "ttf", "--out-dir", "out"]);
        let path = output_path(Path::new("fonts/a.otf"), Target::Ttf, &cli);
        assert_eq!(path, PathBuf::from("out/a.ttf"));
    }

    #[test]
    fn explicit_output_wins() {
        let cli = Cli::parse_from(["crosstype", "a.ttf", "--to", "otf", "-o", "b.otf"]);
        let path = output_path(Path::new("a.ttf"), Target::Otf, &cli);
        assert_eq!(path, PathBuf::from("b.otf"));
    }
}
