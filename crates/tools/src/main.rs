use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use formats::{ManifestBuilder, ManifestDocument, ManifestIndex, SkipReason};
use foundation::time::TimeIndex;
use session::{SelectionState, elevation_label, render_single_view};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build and query run image manifests")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a figure tree and write its manifest
    Manifest {
        /// Directory holding the `Run*` directories
        #[arg(long)]
        root: PathBuf,

        /// Output manifest path
        #[arg(long, default_value = "manifest.json")]
        out: PathBuf,

        /// Base directory image references are written relative to
        #[arg(long)]
        relative_to: Option<PathBuf>,
    },

    /// Summarise a manifest: axes, elevation sets and data-quality issues
    Inspect {
        /// Manifest path
        file: PathBuf,
    },

    /// Resolve one selection the way the viewer does
    Resolve {
        /// Manifest path
        file: PathBuf,

        #[arg(long)]
        run: String,

        #[arg(long)]
        variable: String,

        #[arg(long)]
        conversion: String,

        /// Defaults to the first valid elevation
        #[arg(long)]
        elevation: Option<String>,

        /// 1-based time step
        #[arg(long, default_value_t = 1)]
        time: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output = match args.command {
        Command::Manifest {
            root,
            out,
            relative_to,
        } => cmd_manifest(&root, &out, relative_to)?,
        Command::Inspect { file } => cmd_inspect(&file)?,
        Command::Resolve {
            file,
            run,
            variable,
            conversion,
            elevation,
            time,
        } => {
            let index = load_index(&file)?;
            resolve(&index, &run, &variable, &conversion, elevation.as_deref(), time)
        }
    };
    print!("{output}");
    Ok(())
}

fn load_index(path: &Path) -> anyhow::Result<ManifestIndex> {
    let document = ManifestDocument::load(path)
        .with_context(|| format!("failed to load manifest {}", path.display()))?;
    Ok(ManifestIndex::new(document))
}

fn cmd_manifest(root: &Path, out: &Path, relative_to: Option<PathBuf>) -> anyhow::Result<String> {
    let mut builder = ManifestBuilder::new(root);
    if let Some(base) = relative_to {
        builder = builder.relative_to(base);
    }
    let report = builder
        .build()
        .with_context(|| format!("failed to walk {}", root.display()))?;

    for skipped in &report.skipped {
        match skipped.reason {
            SkipReason::NameMismatch => {
                info!("skipped {}: name does not match", skipped.path.display())
            }
            SkipReason::ZeroTimeStep => {
                warn!("skipped {}: time step 000", skipped.path.display())
            }
        }
    }

    report
        .manifest
        .save(out)
        .with_context(|| format!("failed to write {}", out.display()))?;

    Ok(format!(
        "wrote {} ({} runs, {} images, {} skipped)\n",
        out.display(),
        report.manifest.runs.len(),
        report.images,
        report.skipped.len()
    ))
}

fn cmd_inspect(path: &Path) -> anyhow::Result<String> {
    let index = load_index(path)?;
    Ok(inspect(&index))
}

fn inspect(index: &ManifestIndex) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "runs: {}", index.runs().join(", "));
    let _ = writeln!(out, "variables: {}", index.variables().join(", "));
    let _ = writeln!(out, "conversions: {}", index.conversions().join(", "));
    let _ = writeln!(out, "max time steps: {}", index.max_time_steps());
    let _ = writeln!(out, "images: {}", index.document().image_count());

    for run in index.runs() {
        let _ = writeln!(out, "Run {run}");
        for variable in index.variables() {
            for conversion in index.conversions() {
                let elevations = index.valid_elevations(run, variable, conversion);
                if elevations.is_empty() {
                    continue;
                }
                let labels: Vec<String> = elevations.iter().map(|e| elevation_label(e)).collect();
                let _ = writeln!(out, "  {variable} / {conversion}: {}", labels.join(" "));
            }
        }
    }

    if !index.issues().is_empty() {
        let _ = writeln!(out, "issues:");
        for issue in index.issues() {
            let _ = writeln!(out, "  {issue}");
        }
    }
    out
}

fn resolve(
    index: &ManifestIndex,
    run: &str,
    variable: &str,
    conversion: &str,
    elevation: Option<&str>,
    time_step: usize,
) -> String {
    let mut selection = SelectionState::initial(index);
    selection.set_run(index, run);
    selection.set_variable(index, variable);
    selection.set_conversion(index, conversion);
    if let Some(elevation) = elevation {
        selection.set_elevation(elevation);
    }
    selection.set_time_index(TimeIndex::from_ui_step(time_step));

    let view = render_single_view(index, &selection);
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.heading);
    let _ = writeln!(
        out,
        "elevations: {}",
        selection.valid_elevations().join(", ")
    );
    let _ = writeln!(out, "{}", view.caption);
    if let Some(image_ref) = &view.image_ref {
        let _ = writeln!(out, "{image_ref}");
    }
    out
}
