use anyhow::Result;
use clap::Parser;
use dragon_core::{Mechanism, ModelParams, SimRng, SimulationContext, F};
use dragon_graphs::{GraphGenerator, Gnp};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track how reinforcement hardens one network over time")]
struct Args {
    #[arg(long, default_value_t = 300)]
    nodes: usize,

    #[arg(long, default_value_t = 0.02)]
    edge_probability: F,

    #[arg(long, default_value_t = 20000)]
    steps: usize,

    /// Report window in steps
    #[arg(long, default_value_t = 1000)]
    window: usize,

    #[arg(long, default_value_t = 0.1)]
    epsilon: F,

    /// Use complex contagion instead of inoculation
    #[arg(long)]
    cc: bool,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mechanism = if args.cc { Mechanism::complex_contagion() } else { Mechanism::Inoculation };
    let params = ModelParams::new(mechanism, args.epsilon);

    let mut rng = SimRng::from_trial_id(args.seed, 0);
    let graph = Gnp::new(args.nodes, args.edge_probability).generate(&mut rng)?;
    println!(
        "{} on G(n={}, p={}): {} edges, epsilon={}",
        mechanism,
        graph.num_nodes(),
        args.edge_probability,
        graph.num_edges(),
        args.epsilon
    );
    println!();
    println!("{:>8} {:>10} {:>10} {:>10} {:>10}", "step", "strong", "cascades", "mean", "max");

    let mut ctx = SimulationContext::new(graph, params, rng)?;
    let window = args.window.max(1);
    let mut sizes: Vec<F> = Vec::with_capacity(window);

    for step in 1..=args.steps {
        if let Some(size) = ctx.step()?.cascade_size() {
            sizes.push(size);
        }

        if step % window == 0 || step == args.steps {
            let mean = if sizes.is_empty() { 0.0 } else { sizes.iter().sum::<F>() / sizes.len() as F };
            let max = sizes.iter().copied().fold(0.0, F::max);
            println!(
                "{:>8} {:>10.3} {:>10} {:>10.4} {:>10.4}",
                step,
                ctx.strong_fraction(),
                sizes.len(),
                mean,
                max
            );
            sizes.clear();
        }
    }

    Ok(())
}
