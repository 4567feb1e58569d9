use dragon_core::{CascadeTrace, ModelParams, F};
use dragon_graphs::{GraphGenerator, GraphSpec};
use dragon_sampler::{Ensemble, RunSpec};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub mod cli;
pub mod dot;
pub use cli::*;
pub use dot::DotSnapshotWriter;

/// Run manifest for complete reproducibility
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub seed: u64,
    pub mechanism: String,    // "IN" | "CC"
    pub params: ModelParams,
    pub topology: GraphSpec,
    pub n_nodes: usize,
    pub n_steps: usize,
    pub n_trials: usize,
    pub n_cascades: usize,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

/// Newline-delimited JSON: one object per step, trial-major.
///
/// A step with a cascade is written as its trace (`{"0":0.01,"1":0.03,...}`),
/// a step without one as `{}`.
pub struct TraceWriter<W: Write> {
    out: W,
    lines: usize,
}

impl RunManifest {
    pub fn new(seed: u64, topology: &GraphSpec, spec: &RunSpec) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            seed,
            mechanism: spec.params.mechanism.short_name().to_string(),
            params: spec.params,
            topology: topology.clone(),
            n_nodes: topology.node_count(),
            n_steps: spec.n_steps,
            n_trials: spec.n_trials,
            n_cascades: 0, // Will be set when writing
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

impl TraceWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn write_step(&mut self, trace: Option<&CascadeTrace>) -> anyhow::Result<()> {
        match trace {
            Some(trace) => serde_json::to_writer(&mut self.out, trace)?,
            None => self.out.write_all(b"{}")?,
        }
        self.out.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn write_ensemble(&mut self, ensemble: &Ensemble) -> anyhow::Result<()> {
        for (_, _, trace) in ensemble.step_table() {
            self.write_step(trace)?;
        }
        Ok(())
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(mut self) -> anyhow::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Read an NDJSON trace file back; `None` marks a step without a cascade.
pub fn read_traces(path: &Path) -> anyhow::Result<Vec<Option<CascadeTrace>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut traces = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let trace: CascadeTrace = serde_json::from_str(&line)?;
        traces.push(if trace.is_empty() { None } else { Some(trace) });
    }
    Ok(traces)
}

/// Final fraction of every cascade in a trace file
pub fn cascade_sizes_from_file(path: &Path) -> anyhow::Result<Vec<F>> {
    Ok(read_traces(path)?
        .into_iter()
        .flatten()
        .filter_map(|t| t.final_fraction())
        .collect())
}

/// Write ensemble traces plus manifest
pub fn write_ensemble_with_manifest(
    ensemble: &Ensemble,
    manifest: &RunManifest,
    traces_path: &Path,
    manifest_path: &Path,
) -> anyhow::Result<()> {
    let mut writer = TraceWriter::create(traces_path)?;
    writer.write_ensemble(ensemble)?;
    let lines = writer.lines();
    writer.finish()?;

    let mut manifest_with_counts = manifest.clone();
    manifest_with_counts.n_cascades = ensemble.final_statistics().n_cascades;
    manifest_with_counts.save_to_file(manifest_path)?;

    info!(lines, path = %traces_path.display(), "Wrote traces");
    info!(path = %manifest_path.display(), "Wrote manifest");

    Ok(())
}

/// Manifest path next to a traces file: `runs/out.ndjson` -> `runs/out.manifest.json`
pub fn manifest_path_for(traces_path: &Path) -> std::path::PathBuf {
    traces_path.with_extension("manifest.json")
}

/// Get git commit hash for reproducibility
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
}

fn get_rust_version() -> String {
    std::process::Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
