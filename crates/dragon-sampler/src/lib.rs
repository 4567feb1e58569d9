use dragon_core::{
    CascadeConfig, CascadeTrace, Error, Graph, ModelParams, NodeStatus, Result, SimRng,
    SimulationContext, StepResult, F,
};
use dragon_graphs::GraphGenerator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Run layout: how many trials, how many steps each, which dynamics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub n_steps: usize,
    pub n_trials: usize,
    pub params: ModelParams,
}

/// One trial's step table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: usize,
    pub steps: Vec<StepResult>,
    pub stopped: bool,
    /// Share of strong nodes when the trial ended
    pub final_strong_fraction: F,
}

/// All trials of a run, in trial order
#[derive(Clone, Debug)]
pub struct Ensemble {
    pub trials: Vec<TrialResult>,
    pub spec: RunSpec,
}

/// Statistical summary of ensemble
#[derive(Clone, Debug, PartialEq)]
pub struct EnsembleStats {
    pub n_trials: usize,
    pub steps_run: usize,
    pub n_cascades: usize,
    pub mean_size: F,
    pub max_size: F,
    pub mean_final_strong_fraction: F,
    pub stopped_trials: usize,
}

/// Stopping conditions beyond the fixed step count
#[derive(Clone, Debug, Default)]
pub struct Stopping {
    /// Wall-clock budget per trial, checked between steps
    pub max_wall_time: Option<Duration>,
}

/// Read-only view of a trial after each step (visualization hook)
pub trait StepObserver {
    /// `step` 0 is the initial state; step `s` is the state after `s` steps
    fn observe(&mut self, trial_id: usize, step: usize, graph: &Graph, statuses: &[NodeStatus]);
}

struct NoObserver;

impl StepObserver for NoObserver {
    fn observe(&mut self, _trial_id: usize, _step: usize, _graph: &Graph, _statuses: &[NodeStatus]) {}
}

/// Main driver: fresh graph and state per trial, trials in parallel
pub struct Sampler<G: GraphGenerator> {
    pub generator: G,
    pub spec: RunSpec,
    pub cascade: CascadeConfig,
}

impl<G: GraphGenerator> Sampler<G> {
    pub fn new(generator: G, spec: RunSpec) -> Result<Self> {
        spec.validate()?;
        generator.validate()?;
        Ok(Self { generator, spec, cascade: CascadeConfig::default() })
    }

    pub fn with_cascade_config(mut self, cascade: CascadeConfig) -> Self {
        self.cascade = cascade;
        self
    }

    /// Run every trial on the rayon pool. Each trial draws from its own
    /// stream, so the result does not depend on the thread count.
    pub fn run_trials(&self, stopping: &Stopping, global_seed: u64) -> Result<Ensemble> {
        info!(
            n_trials = self.spec.n_trials,
            n_steps = self.spec.n_steps,
            nodes = self.generator.node_count(),
            mechanism = %self.spec.params.mechanism,
            epsilon = self.spec.params.epsilon,
            seed = global_seed,
            "Starting run"
        );

        let trials = (0..self.spec.n_trials)
            .into_par_iter()
            .map(|trial_id| self.run_single_trial(trial_id, stopping, global_seed, &mut NoObserver))
            .collect::<Result<Vec<_>>>()?;

        let ensemble = Ensemble::new(trials, self.spec.clone());
        info!(cascades = ensemble.final_statistics().n_cascades, "Run finished");
        Ok(ensemble)
    }

    /// Sequential run with `observer` attached to every trial
    pub fn run_trials_observed(
        &self,
        stopping: &Stopping,
        global_seed: u64,
        observer: &mut dyn StepObserver,
    ) -> Result<Ensemble> {
        let trials = (0..self.spec.n_trials)
            .map(|trial_id| self.run_single_trial(trial_id, stopping, global_seed, observer))
            .collect::<Result<Vec<_>>>()?;
        Ok(Ensemble::new(trials, self.spec.clone()))
    }

    /// Run a single trial (called by run_trials)
    pub fn run_single_trial(
        &self,
        trial_id: usize,
        stopping: &Stopping,
        global_seed: u64,
        observer: &mut dyn StepObserver,
    ) -> Result<TrialResult> {
        let started = Instant::now();
        let mut rng = SimRng::from_trial_id(global_seed, trial_id as u64);
        let graph = self.generator.generate(&mut rng)?;
        let mut ctx = SimulationContext::new(graph, self.spec.params, rng)?
            .with_cascade_config(self.cascade.clone());

        let mut steps = Vec::with_capacity(self.spec.n_steps);
        let mut stopped = false;
        observer.observe(trial_id, 0, ctx.graph(), ctx.store().all());

        for step in 1..=self.spec.n_steps {
            if stopping.exhausted(started) {
                stopped = true;
                break;
            }
            steps.push(ctx.step()?);
            observer.observe(trial_id, step, ctx.graph(), ctx.store().all());
        }

        let result = TrialResult {
            trial_id,
            steps,
            stopped,
            final_strong_fraction: ctx.strong_fraction(),
        };
        debug!(
            trial_id,
            steps = result.steps.len(),
            cascades = result.n_cascades(),
            strong = result.final_strong_fraction,
            stopped,
            "Trial finished"
        );
        Ok(result)
    }
}

// Implementations
impl RunSpec {
    pub fn new(n_steps: usize, n_trials: usize, params: ModelParams) -> Self {
        Self { n_steps, n_trials, params }
    }

    pub fn total_steps(&self) -> usize {
        self.n_steps * self.n_trials
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_steps == 0 {
            return Err(Error::InvalidParameter("n_steps must be at least 1".to_string()));
        }
        if self.n_trials == 0 {
            return Err(Error::InvalidParameter("n_trials must be at least 1".to_string()));
        }
        self.params.validate()
    }
}

impl TrialResult {
    pub fn n_cascades(&self) -> usize {
        self.steps.iter().filter(|s| s.trace.is_some()).count()
    }

    pub fn cascade_sizes(&self) -> impl Iterator<Item = F> + '_ {
        self.steps.iter().filter_map(|s| s.cascade_size())
    }
}

impl Ensemble {
    pub fn new(trials: Vec<TrialResult>, spec: RunSpec) -> Self {
        Self { trials, spec }
    }

    pub fn n_trials(&self) -> usize {
        self.trials.len()
    }

    /// Final failure fraction of every triggered cascade
    pub fn cascade_sizes(&self) -> Vec<F> {
        self.trials.iter().flat_map(|t| t.cascade_sizes()).collect()
    }

    /// Trial-major, step-minor walk over every step's trace
    pub fn step_table(&self) -> impl Iterator<Item = (usize, usize, Option<&CascadeTrace>)> + '_ {
        self.trials.iter().flat_map(|trial| {
            trial
                .steps
                .iter()
                .enumerate()
                .map(move |(step, result)| (trial.trial_id, step, result.trace.as_ref()))
        })
    }

    pub fn final_statistics(&self) -> EnsembleStats {
        let sizes = self.cascade_sizes();
        let steps_run = self.trials.iter().map(|t| t.steps.len()).sum();
        let stopped_trials = self.trials.iter().filter(|t| t.stopped).count();

        if self.trials.is_empty() {
            return EnsembleStats::empty();
        }

        let mean_size = if sizes.is_empty() {
            0.0
        } else {
            sizes.iter().sum::<F>() / sizes.len() as F
        };
        let max_size = sizes.iter().copied().fold(0.0, F::max);
        let mean_final_strong_fraction = self.trials.iter().map(|t| t.final_strong_fraction).sum::<F>()
            / self.trials.len() as F;

        EnsembleStats {
            n_trials: self.trials.len(),
            steps_run,
            n_cascades: sizes.len(),
            mean_size,
            max_size,
            mean_final_strong_fraction,
            stopped_trials,
        }
    }
}

impl EnsembleStats {
    fn empty() -> Self {
        Self {
            n_trials: 0,
            steps_run: 0,
            n_cascades: 0,
            mean_size: 0.0,
            max_size: 0.0,
            mean_final_strong_fraction: 0.0,
            stopped_trials: 0,
        }
    }
}

impl Stopping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_wall_time(mut self, max_wall_time: Duration) -> Self {
        self.max_wall_time = Some(max_wall_time);
        self
    }

    pub fn exhausted(&self, started: Instant) -> bool {
        match self.max_wall_time {
            Some(budget) => started.elapsed() >= budget,
            None => false,
        }
    }
}
