//! Inspect command - Print a stored policy

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    app::App,
    cli::output::{print_kv, print_section, print_subsection},
    neural::{NetworkParameters, QNetwork},
    policy::{SavedPolicy, TrainedPolicy},
    q_learning::ActionValueTable,
};

#[derive(Parser, Debug)]
#[command(about = "Print a stored opponent policy")]
pub struct InspectArgs {
    /// Policy file written by `pacer train`
    pub policy: PathBuf,

    /// Only list states whose values moved away from zero
    #[arg(long)]
    pub visited_only: bool,

    /// Evaluate a network policy at `position,relative,time_ms`
    #[arg(long, value_delimiter = ',', num_args = 3)]
    pub probe: Option<Vec<f32>>,
}

fn print_metadata(saved: &SavedPolicy) {
    let metadata = &saved.metadata;
    print_kv("Format version", &saved.version.to_string());
    print_kv("Policy", saved.policy.kind());
    if let Some(player) = &metadata.player_id {
        print_kv("Player", player);
    }
    if let Some(episodes) = metadata.episodes_trained {
        print_kv("Episodes", &episodes.to_string());
    }
    if let Some(steps) = metadata.steps {
        print_kv("Steps", &steps.to_string());
    }
    if let Some(reward) = metadata.cumulative_reward {
        print_kv("Cumulative reward", &reward.to_string());
    }
    if let Some(seed) = metadata.seed {
        print_kv("Seed", &seed.to_string());
    }
}

fn print_table(table: &ActionValueTable, visited_only: bool) {
    print_subsection(&format!(
        "Action values (α = {}, γ = {})",
        table.learning_rate(),
        table.discount_factor()
    ));
    println!("  {:>8} {:>12} {:>12}  greedy", "state", "drive", "boost");
    for (state, row) in table.iter() {
        if visited_only && row.iter().all(|&q| q == 0.0) {
            continue;
        }
        println!(
            "  {:>8} {:>12.5} {:>12.5}  {}",
            state.to_string(),
            row[0],
            row[1],
            table.greedy_action(state)
        );
    }
    println!("\n  {} of 60 entries visited", table.visited());
}

fn print_network(parameters: &NetworkParameters, probe: Option<&[f32]>) -> Result<()> {
    print_subsection("Network");
    print_kv(
        "Layers",
        &format!(
            "{}-{}-{}",
            parameters.input_size(),
            parameters.hidden_size(),
            parameters.output_size()
        ),
    );

    if let Some(probe) = probe {
        let &[position, relative, time_ms] = probe else {
            bail!("--probe expects exactly three values");
        };
        let network = QNetwork::from_parameters(parameters.clone());
        let pass = network.forward(probe)?;
        print_kv(
            "Q(drive, boost)",
            &format!("{:.5}, {:.5}", pass.output[0], pass.output[1]),
        );
        print_kv(
            "Greedy action",
            &network
                .best_action(position, relative, time_ms)?
                .to_string(),
        );
    }
    Ok(())
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let app = App::new();
    let saved = app
        .load_policy(&args.policy)
        .with_context(|| format!("Failed to load policy {}", args.policy.display()))?;

    print_section(&format!("Policy {}", args.policy.display()));
    print_metadata(&saved);

    match &saved.policy {
        TrainedPolicy::Tabular(table) => print_table(table, args.visited_only),
        TrainedPolicy::Network(parameters) => print_network(parameters, args.probe.as_deref())?,
    }
    Ok(())
}
