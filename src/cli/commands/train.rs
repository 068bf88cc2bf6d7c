//! Train command - Train an opponent from a player's recorded race

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    adapters::CsvTrajectoryProvider,
    app::{App, LearnerKind, TrainerConfig},
    cli::output::{format_number, format_reward, print_section, print_stats_table},
    export::RewardCsvExporter,
    pipeline::{MetricsObserver, MetricsSummary, ProgressObserver, TrainingReport},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LearnerType {
    /// Tabular SARSA
    Sarsa,
    /// Neural approximator with target network
    DeepQ,
}

impl From<LearnerType> for LearnerKind {
    fn from(value: LearnerType) -> Self {
        match value {
            LearnerType::Sarsa => LearnerKind::Sarsa,
            LearnerType::DeepQ => LearnerKind::DeepQ,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    player_id: &'a str,
    learner: &'a str,
    policy: &'a str,
    output: String,
    training: &'a crate::environment::TrainingSummary,
    metrics: MetricsSummary,
    config: &'a TrainerConfig,
}

pub(crate) fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Trailing separators or a missing filename mean a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train an opponent from a recorded race")]
pub struct TrainArgs {
    /// Directory holding `<player>.csv` recordings
    #[arg(long, short = 't')]
    pub trajectories: PathBuf,

    /// Player whose recording is replayed
    #[arg(long, short = 'p')]
    pub player: String,

    /// Type of learner to train (overrides the config file)
    #[arg(long, value_enum)]
    pub learner: Option<LearnerType>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Synthetic copies of the recording to request
    #[arg(long)]
    pub duplicate: Option<usize>,

    /// Output file for the trained policy
    #[arg(long, short = 'O', default_value = "opponent.msgpack")]
    pub output: PathBuf,

    /// Optional CSV file for the per-step reward history
    #[arg(long)]
    pub rewards: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// JSON file with trainer settings
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Trainer settings from the config file with flag overrides applied.
    pub fn trainer_config(&self) -> Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TrainerConfig::default(),
        };

        if let Some(learner) = self.learner {
            config = config.with_learner(learner.into());
        }
        if let Some(episodes) = self.episodes {
            config = config.with_episodes(episodes);
        }
        if let Some(factor) = self.duplicate {
            config = config.with_duplication_factor(factor);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        config.validate().context("Invalid trainer configuration")?;
        Ok(config)
    }
}

fn print_report(report: &TrainingReport, metrics: &MetricsSummary, output: &Path) {
    print_section(&format!("{} training for '{}'", report.learner, report.player_id));
    let episodes = format_number(report.summary.episodes);
    let steps = format_number(report.summary.steps);
    let duplication = report.duplication_factor.to_string();
    let cumulative = format_reward(report.summary.cumulative_reward);
    let on_pace = format!("{:.1}%", report.summary.on_pace_rate * 100.0);
    let best = metrics
        .best_episode_reward
        .map_or_else(|| "-".to_string(), format_reward);
    let worst = metrics
        .worst_episode_reward
        .map_or_else(|| "-".to_string(), format_reward);

    print_stats_table(&[
        ("Episodes", episodes.as_str()),
        ("Steps", steps.as_str()),
        ("Duplication factor", duplication.as_str()),
        ("Cumulative reward", cumulative.as_str()),
        ("On pace", on_pace.as_str()),
        ("Best episode", best.as_str()),
        ("Worst episode", worst.as_str()),
    ]);
    println!("\n✓ {} policy saved to: {}", report.policy_kind, output.display());
}

pub async fn execute(args: TrainArgs) -> Result<()> {
    let config = args.trainer_config()?;

    let summary_target = args.summary.as_ref().map(|raw| {
        let sanitized = sanitize_summary_path(raw);
        let normalized = sanitized != *raw;
        (sanitized, normalized)
    });

    let app = App::new();
    let provider = Box::new(CsvTrajectoryProvider::new(&args.trajectories));
    let sink = app.policy_sink(&args.output);
    let metrics = MetricsObserver::new();

    let mut builder = app
        .training_session(&config, provider, sink)?
        .observer(Box::new(metrics.clone()));
    if !args.no_progress {
        builder = builder.observer(Box::new(ProgressObserver::new()));
    }
    let mut session = builder.build()?;

    let report = session
        .run(&args.player)
        .await
        .with_context(|| format!("Training failed for player '{}'", args.player))?;
    let metrics_summary = metrics.summary();

    print_report(&report, &metrics_summary, &args.output);

    if let Some(path) = &args.rewards {
        RewardCsvExporter::export(&report.rewards, path)
            .with_context(|| format!("Failed to export rewards to {}", path.display()))?;
        println!("Rewards written to {}", path.display());
    }

    if let Some((summary_path, normalized)) = summary_target {
        if normalized {
            println!(
                "\n⚠️  Normalizing summary path to {}",
                summary_path.display()
            );
        }

        if let Some(parent) = summary_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let summary = TrainingSummaryFile {
            player_id: &report.player_id,
            learner: &report.learner,
            policy: &report.policy_kind,
            output: args.output.display().to_string(),
            training: &report.summary,
            metrics: metrics_summary,
            config: &config,
        };

        let file = File::create(&summary_path)
            .with_context(|| format!("Failed to create {}", summary_path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_summary_path() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/summary.json")),
            PathBuf::from("out/summary.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/summary.txt")),
            PathBuf::from("out/summary.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/")),
            PathBuf::from("out/training_summary.json")
        );
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = TrainArgs::parse_from([
            "train",
            "--trajectories",
            "recordings",
            "--player",
            "ada",
            "--learner",
            "deep-q",
            "--episodes",
            "27",
            "--seed",
            "5",
        ]);

        let config = args.trainer_config().unwrap();
        assert_eq!(config.learner, LearnerKind::DeepQ);
        assert_eq!(config.effective_episodes(), 27);
        assert_eq!(config.effective_duplication_factor(), 2);
        assert_eq!(config.seed, Some(5));
    }
}
