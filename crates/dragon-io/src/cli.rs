use crate::{manifest_path_for, write_ensemble_with_manifest, DotSnapshotWriter, RunManifest};
use dragon_core::{InitialStatus, Mechanism, ModelParams, F};
use dragon_graphs::{BarabasiAlbert, GraphGenerator, GraphSpec, Gnm, Gnp};
use dragon_sampler::{RunSpec, Sampler, Stopping};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dragon")]
#[command(about = "DRAGON - cascading failures and self-organized criticality on random graphs")]
#[command(long_about = "Degrade, cascade, repair and reinforce: step-driven failure dynamics under inoculation or complex contagion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run trials and optionally write cascade traces as NDJSON
    Run(RunArgs),
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Steps per trial
    #[arg(long, default_value = "1000")]
    pub n_steps: usize,

    /// Independent trials, each on a fresh graph
    #[arg(long, default_value = "1")]
    pub n_trials: usize,

    /// Nodes per graph
    #[arg(long, default_value = "100")]
    pub n_nodes: usize,

    /// Edge count (edges per new node for ba, total edges for gnm)
    #[arg(long, conflicts_with = "edge_probability")]
    pub n_edges: Option<usize>,

    /// Edge probability for G(n,p)
    #[arg(long)]
    pub edge_probability: Option<F>,

    /// Reinforcement probability for nodes that failed in a cascade
    #[arg(long, default_value = "0.2")]
    pub epsilon: F,

    /// Failure mechanism
    #[arg(long, value_enum, default_value = "in")]
    pub mechanism: MechanismType,

    /// Failed neighbors needed to break a strong node under cc
    #[arg(long, default_value = "2")]
    pub cc_threshold: usize,

    /// Graph model (default: ba with --n-edges, gnp with --edge-probability)
    #[arg(long, value_enum)]
    pub topology: Option<TopologyType>,

    /// Initial node statuses
    #[arg(long, value_enum, default_value = "weak")]
    pub initial: InitialType,

    /// Minimum degree of a node that starts strong under --initial degree
    #[arg(long, default_value = "2")]
    pub strong_degree: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Output NDJSON trace file; a manifest is written next to it
    #[arg(long)]
    pub export_path: Option<PathBuf>,

    /// Wall-clock budget per trial in seconds
    #[arg(long)]
    pub max_seconds: Option<f64>,

    /// Debug-level logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Write a Graphviz snapshot per step into this directory (runs trials sequentially)
    #[arg(long)]
    pub visualize_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MechanismType {
    #[value(name = "in")]
    Inoculation,
    #[value(name = "cc")]
    ComplexContagion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TopologyType {
    #[value(name = "ba")]
    BarabasiAlbert,
    #[value(name = "gnm")]
    Gnm,
    #[value(name = "gnp")]
    Gnp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InitialType {
    #[value(name = "weak")]
    Weak,
    #[value(name = "degree")]
    Degree,
}

impl RunArgs {
    pub fn mechanism(&self) -> Mechanism {
        match self.mechanism {
            MechanismType::Inoculation => Mechanism::Inoculation,
            MechanismType::ComplexContagion => Mechanism::ComplexContagion {
                strong_threshold: self.cc_threshold,
            },
        }
    }

    pub fn initial(&self) -> InitialStatus {
        match self.initial {
            InitialType::Weak => InitialStatus::AllWeak,
            InitialType::Degree => InitialStatus::DegreeSeeded {
                strong_degree: self.strong_degree,
            },
        }
    }

    pub fn graph_spec(&self) -> anyhow::Result<GraphSpec> {
        let n = self.n_nodes;
        let spec = match self.topology {
            None => GraphSpec::from_params(n, self.n_edges, self.edge_probability)?,
            Some(TopologyType::BarabasiAlbert) => {
                let m = self.n_edges.context("--topology ba needs --n-edges")?;
                GraphSpec::BarabasiAlbert(BarabasiAlbert::new(n, m))
            }
            Some(TopologyType::Gnm) => {
                let m = self.n_edges.context("--topology gnm needs --n-edges")?;
                GraphSpec::Gnm(Gnm::new(n, m))
            }
            Some(TopologyType::Gnp) => {
                let p = self.edge_probability.context("--topology gnp needs --edge-probability")?;
                GraphSpec::Gnp(Gnp::new(n, p))
            }
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn run_spec(&self) -> anyhow::Result<RunSpec> {
        let params = ModelParams::new(self.mechanism(), self.epsilon).with_initial(self.initial());
        let spec = RunSpec::new(self.n_steps, self.n_trials, params);
        spec.validate()?;
        Ok(spec)
    }

    pub fn stopping(&self) -> anyhow::Result<Stopping> {
        match self.max_seconds {
            None => Ok(Stopping::new()),
            Some(secs) if secs.is_finite() && secs >= 0.0 => {
                Ok(Stopping::new().with_max_wall_time(Duration::from_secs_f64(secs)))
            }
            Some(secs) => anyhow::bail!("--max-seconds must be a non-negative number, got {}", secs),
        }
    }
}

pub fn run_command(args: RunArgs) -> anyhow::Result<()> {
    let topology = args.graph_spec()?;
    let spec = args.run_spec()?;
    let stopping = args.stopping()?;

    println!("DRAGON Cascade Simulation");
    println!("=========================");
    println!("Topology: {}", topology);
    println!("Mechanism: {}", spec.params.mechanism);
    println!("Epsilon: {}", spec.params.epsilon);
    println!("Initial: {:?}", spec.params.initial);
    println!("Steps: {}", spec.n_steps);
    println!("Trials: {}", spec.n_trials);
    println!("Seed: {}", args.seed);
    if let Some(out) = &args.export_path {
        println!("Output: {:?}", out);
    }

    let manifest = RunManifest::new(args.seed, &topology, &spec);
    let sampler = Sampler::new(topology, spec)?;

    let ensemble = match &args.visualize_dir {
        Some(dir) => {
            let mut snapshots = DotSnapshotWriter::new(dir)
                .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
            let ensemble = sampler.run_trials_observed(&stopping, args.seed, &mut snapshots)?;
            let written = snapshots.finish().context("writing snapshots")?;
            println!("Snapshots: {} in {:?}", written, dir);
            ensemble
        }
        None => sampler.run_trials(&stopping, args.seed)?,
    };

    if let Some(out) = &args.export_path {
        let manifest_path = manifest_path_for(out);
        write_ensemble_with_manifest(&ensemble, &manifest, out, &manifest_path)?;
    }

    let stats = ensemble.final_statistics();
    println!();
    println!("Summary Statistics:");
    println!("==================");
    println!("Trials completed: {}", stats.n_trials);
    println!("Steps run: {}", stats.steps_run);
    println!(
        "Cascades: {} ({:.1}% of steps)",
        stats.n_cascades,
        if stats.steps_run > 0 {
            stats.n_cascades as F / stats.steps_run as F * 100.0
        } else {
            0.0
        }
    );
    println!("Mean cascade size: {:.4}", stats.mean_size);
    println!("Max cascade size: {:.4}", stats.max_size);
    println!("Mean final strong fraction: {:.4}", stats.mean_final_strong_fraction);
    if stats.stopped_trials > 0 {
        println!("Trials stopped by wall-clock budget: {}", stats.stopped_trials);
    }

    Ok(())
}
