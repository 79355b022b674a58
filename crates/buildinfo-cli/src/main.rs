use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buildinfo_core::{Artifact, GenError, Generator, GeneratorOptions, NamingStyle};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "buildinfo")]
#[command(about = "Generate C accessor code (header + source) from a JSON field schema.", long_about = None)]
struct Cli {
    /// JSON input: one object or an array of objects.
    input: PathBuf,
    /// Output path without extension (a trailing .c/.h is stripped); writes <output>.c and <output>.h.
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = Naming::Pascal)]
    naming: Naming,
    /// If set, fail if either output is stale; do not write.
    #[arg(long, default_value_t = false)]
    check: bool,
    /// Print both files to stdout instead of writing them.
    #[arg(long, default_value_t = false, conflicts_with = "check")]
    stdout: bool,
    /// Print a JSON report of the generated files to stdout.
    #[arg(long, default_value_t = false, conflicts_with = "stdout")]
    report_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Naming {
    Pascal,
    Snake,
}

impl From<Naming> for NamingStyle {
    fn from(n: Naming) -> Self {
        match n {
            Naming::Pascal => NamingStyle::Pascal,
            Naming::Snake => NamingStyle::Snake,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    header: FileReport,
    source: FileReport,
}

#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    error: &'a GenError,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    sha256: String,
    written: bool,
}

fn main() -> Result<()> {
    init_tracing();
    try_main().map_err(|err| {
        eprintln!("{err:#}");
        err
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let src = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("read input: {}", cli.input.display()))?;

    let out_base = strip_c_extension(&cli.output);
    let filename_base = out_base
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("output path has no file name: {}", cli.output.display()))?;
    debug!(filename_base = %filename_base, "resolved output base");

    let mut generator = Generator::new(GeneratorOptions {
        filename_base: Some(filename_base),
    })
    .with_naming(NamingStyle::from(cli.naming).formatter());
    if let Err(err) = generator.process_json(&src) {
        if cli.report_json {
            println!("{}", serde_json::to_string_pretty(&ErrorReport { error: &err })?);
        }
        return Err(err).with_context(|| format!("convert: {}", cli.input.display()));
    }
    let rendered = generator.render();

    let header_path = with_suffix(&out_base, "h");
    let source_path = with_suffix(&out_base, "c");

    if cli.stdout {
        print!("{}", rendered.header.text);
        print!("{}", rendered.source.text);
        return Ok(());
    }

    let header_written = write_artifact(&header_path, &rendered.header, cli.check)?;
    let source_written = write_artifact(&source_path, &rendered.source, cli.check)?;

    if cli.report_json {
        let report = Report {
            header: FileReport {
                path: header_path.display().to_string(),
                sha256: rendered.header.digest,
                written: header_written,
            },
            source: FileReport {
                path: source_path.display().to_string(),
                sha256: rendered.source.digest,
                written: source_written,
            },
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// `out/info.C` -> `out/info`; any other extension is part of the name.
fn strip_c_extension(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("c") || ext.eq_ignore_ascii_case("h") => {
            path.with_extension("")
        }
        _ => path.to_path_buf(),
    }
}

fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Returns whether the file was (or, under `check`, would be) rewritten.
fn write_artifact(path: &Path, artifact: &Artifact, check: bool) -> Result<bool> {
    let existing = match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("read existing output: {}", path.display()))
        }
    };

    if !artifact.needs_write(existing.as_deref()) {
        info!(path = %path.display(), "up to date, skipping");
        return Ok(false);
    }

    if check {
        anyhow::bail!("generated output differs: {}", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(path, artifact.text.as_bytes())
        .with_context(|| format!("write output: {}", path.display()))?;
    info!(path = %path.display(), digest = %artifact.digest, "wrote");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_only_c_and_h_extensions() {
        assert_eq!(strip_c_extension(Path::new("out/info.c")), PathBuf::from("out/info"));
        assert_eq!(strip_c_extension(Path::new("out/info.H")), PathBuf::from("out/info"));
        assert_eq!(strip_c_extension(Path::new("info")), PathBuf::from("info"));
        assert_eq!(strip_c_extension(Path::new("build.info")), PathBuf::from("build.info"));
    }

    #[test]
    fn suffix_keeps_dotted_names() {
        assert_eq!(with_suffix(Path::new("build.info"), "h"), PathBuf::from("build.info.h"));
    }
}
