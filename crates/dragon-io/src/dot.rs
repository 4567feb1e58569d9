use dragon_core::{Graph, NodeStatus};
use dragon_sampler::StepObserver;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Writes Graphviz snapshots of node statuses while a run is observed.
///
/// red: failed, yellow: weak, green: strong. Layout is left to Graphviz
/// (`neato -Tpng trial0_step12.dot`).
pub struct DotSnapshotWriter {
    dir: PathBuf,
    every: usize,
    written: usize,
    error: Option<std::io::Error>,
}

impl DotSnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, every: 1, written: 0, error: None })
    }

    /// Only snapshot every `every`-th step (step 0 is always written)
    pub fn with_stride(mut self, every: usize) -> Self {
        self.every = every.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// First write error, if any snapshot failed
    pub fn finish(self) -> std::io::Result<usize> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.written),
        }
    }
}

pub fn status_color(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Failed => "red",
        NodeStatus::Weak => "yellow",
        NodeStatus::Strong => "green",
    }
}

/// Render one status snapshot as an undirected DOT graph
pub fn render_dot(graph: &Graph, statuses: &[NodeStatus], title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "graph \"{}\" {{", title);
    let _ = writeln!(out, "  label=\"{}\";", title);
    let _ = writeln!(out, "  node [style=filled, shape=circle];");
    for (node, &status) in statuses.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {} [label=\"{}\", fillcolor={}];",
            node,
            status.as_u8(),
            status_color(status)
        );
    }
    for edge in graph.edges() {
        let _ = writeln!(out, "  {} -- {};", edge.u, edge.v);
    }
    out.push_str("}\n");
    out
}

impl StepObserver for DotSnapshotWriter {
    fn observe(&mut self, trial_id: usize, step: usize, graph: &Graph, statuses: &[NodeStatus]) {
        if self.error.is_some() || step % self.every != 0 {
            return;
        }

        let title = format!("Trial {} | Time Step: {}", trial_id, step);
        let path = self.dir.join(format!("trial{}_step{}.dot", trial_id, step));
        match std::fs::write(&path, render_dot(graph, statuses, &title)) {
            Ok(()) => self.written += 1,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Snapshot write failed, disabling snapshots");
                self.error = Some(err);
            }
        }
    }
}
