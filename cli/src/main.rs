//! CLI entrypoint for atelier
//!
//! Wires the studio adapters, the scripted gateway and the filesystem stores
//! into a pipeline orchestrator, then streams run events to the console.
//! When human review is enabled the console doubles as the review surface.

use anyhow::{bail, Context, Result};
use atelier_application::ports::ScoutPort;
use atelier_application::{AgentRuntime, CriticEngine, PipelineOrchestrator, RunRegistry};
use atelier_domain::{
    AnalysisBoard, CulturalTradition, HumanAction, Layer, PipelineEvent, PipelineInput, Stage,
};
use atelier_infrastructure::{
    ConfigLoader, CriticToolbox, FileConfig, FsArchivist, FsCheckpointStore, JsonlEventLog,
    LayerModelRouter, ScriptedGateway, StudioDraft, StudioScout,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atelier", version, about = "Layered evaluation pipeline for generated artwork")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ignore all config files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new evaluation run
    Run(RunArgs),
    /// Resume an interrupted run from a checkpointed stage
    Resume(ResumeArgs),
    /// Print the config file locations in priority order
    ConfigPaths,
}

#[derive(Args)]
struct RunArgs {
    /// Unique task identifier; also the checkpoint directory name
    #[arg(long)]
    task_id: String,

    /// Subject of the work, e.g. "winter heron at dusk"
    #[arg(long)]
    subject: String,

    /// Cultural tradition the work is evaluated against
    #[arg(long, default_value = "contemporary")]
    tradition: String,

    /// Pause for a human verdict after every decision
    #[arg(long)]
    hitl: bool,

    /// Skip agent escalation; rule baseline only
    #[arg(long)]
    no_escalation: bool,
}

#[derive(Args)]
struct ResumeArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Stage to resume from; earlier stages load from checkpoints
    #[arg(long)]
    from: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!("{e}"))?
    };

    match cli.command {
        Commands::Run(args) => execute(args, None, config).await,
        Commands::Resume(args) => {
            let stage: Stage = args
                .from
                .parse()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .context("unknown stage; expected scout, draft, critic, queen or archivist")?;
            execute(args.run, Some(stage), config).await
        }
        Commands::ConfigPaths => {
            if let Some(path) = ConfigLoader::global_config_path() {
                let marker = if path.exists() { "FOUND" } else { "     " };
                println!("[{marker}] Global:  {}", path.display());
            }
            match ConfigLoader::project_config_path() {
                Some(path) => println!("[FOUND] Project: {}", path.display()),
                None => println!("[     ] Project: ./atelier.toml or ./.atelier.toml"),
            }
            println!("[     ] Default: built-in defaults");
            Ok(())
        }
    }
}

async fn execute(args: RunArgs, resume_from: Option<Stage>, config: FileConfig) -> Result<()> {
    let tradition: CulturalTradition = args
        .tradition
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut pipeline_config = config.pipeline.clone();
    if args.hitl {
        pipeline_config.hitl.enabled = true;
    }
    let pipeline_config = pipeline_config
        .validated()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let event_log = config
        .storage
        .event_log
        .as_ref()
        .and_then(JsonlEventLog::new);

    // === Dependency injection ===
    let scout = Arc::new(StudioScout::new());
    let draft = Arc::new(StudioDraft::default());
    let board = AnalysisBoard::new();

    let agent = if args.no_escalation {
        None
    } else {
        // The offline gateway replays a fixed verdict; swap in a live
        // provider adapter here once one exists.
        let evidence = scout
            .gather_evidence(&args.subject, tradition, &[])
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        let gateway = Arc::new(ScriptedGateway::always_submitting(
            0.8,
            0.85,
            "scripted studio verdict",
        ));
        let toolbox = Arc::new(CriticToolbox::new(evidence, board.clone()));
        let router = Arc::new(LayerModelRouter::new(
            config.models.vision_choice(),
            config.models.text_choice(),
            pipeline_config.cost.llm_budget_usd,
        ));
        Some(Arc::new(AgentRuntime::new(
            gateway,
            toolbox,
            router,
            pipeline_config.agent.clone(),
        )))
    };

    let critic = Arc::new(
        CriticEngine::new(
            agent,
            pipeline_config.critic.clone(),
            pipeline_config.weights.clone(),
            pipeline_config.gate,
        )
        .with_board(board),
    );

    let hitl_enabled = pipeline_config.hitl.enabled;
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        scout,
        draft,
        critic,
        Arc::new(FsArchivist::new(config.storage.archive_dir())),
        Arc::new(FsCheckpointStore::new(config.storage.checkpoint_dir())),
        Arc::new(RunRegistry::new()),
        pipeline_config,
    ));

    let mut input = PipelineInput::new(&args.task_id, &args.subject, tradition);
    if let Some(stage) = resume_from {
        input = input.with_resume_from(stage);
    }

    info!(task = %args.task_id, tradition = %tradition, "starting run");
    let mut handle = orchestrator.run(input);

    let mut failed = false;
    while let Some(event) = handle.next_event().await {
        if let Some(log) = &event_log {
            log.log(&event);
        }
        print_event(&event);

        if hitl_enabled {
            if let PipelineEvent::HumanRequired { .. } = &event {
                let action = prompt_for_action().await;
                match action {
                    Some(action) => {
                        orchestrator.submit_action(&args.task_id, action);
                    }
                    None => println!("  no action given; the run proceeds on timeout"),
                }
            }
        }
        if matches!(event, PipelineEvent::PipelineFailed { .. }) {
            failed = true;
        }
    }

    if failed {
        bail!("run {} failed", args.task_id);
    }
    Ok(())
}

fn print_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::StageStarted { stage, round, .. } => {
            println!("[round {round}] {stage} started");
        }
        PipelineEvent::StageCompleted {
            stage,
            round,
            summary,
            latency_ms,
            ..
        } => {
            println!("[round {round}] {stage} completed in {latency_ms} ms: {summary}");
        }
        PipelineEvent::StageSkipped { result, round, .. } => {
            println!("[round {round}] {} skipped: {}", result.stage, result.summary);
        }
        PipelineEvent::DecisionMade {
            action,
            reason,
            rerun_dimensions,
            round,
            ..
        } => {
            print!("[round {round}] decision: {action} ({reason})");
            if rerun_dimensions.is_empty() {
                println!();
            } else {
                let dims: Vec<&str> = rerun_dimensions.iter().map(|l| l.as_str()).collect();
                println!(" targeting {}", dims.join(", "));
            }
        }
        PipelineEvent::HumanRequired {
            decision, reason, ..
        } => {
            println!("human review required: the queen proposes {decision} ({reason})");
        }
        PipelineEvent::HumanReceived { action, .. } => {
            println!("human action received: {}", action.as_str());
        }
        PipelineEvent::PipelineCompleted {
            final_decision,
            best_candidate_id,
            total_rounds,
            total_cost_usd,
            ..
        } => {
            println!(
                "run complete: {final_decision} after {total_rounds} round(s), {:.3} USD spent",
                total_cost_usd
            );
            if let Some(id) = best_candidate_id {
                println!("best candidate: {id}");
            }
        }
        PipelineEvent::PipelineFailed {
            error,
            stages_completed,
            ..
        } => {
            let stages: Vec<&str> = stages_completed.iter().map(|s| s.as_str()).collect();
            println!("run failed: {error} (completed stages: {})", stages.join(", "));
        }
    }
}

async fn prompt_for_action() -> Option<HumanAction> {
    println!("  enter action: approve | reject [reason] | rerun [dims] | lock <dims> | accept [candidate]");
    let line = tokio::task::spawn_blocking(|| {
        let mut buffer = String::new();
        std::io::stdin().read_line(&mut buffer).ok()?;
        Some(buffer)
    })
    .await
    .ok()
    .flatten()?;
    let action = parse_human_action(&line);
    if action.is_none() {
        println!("  unrecognized action '{}'", line.trim());
    }
    action
}

fn parse_layers(spec: &str) -> Vec<Layer> {
    spec.split(',')
        .filter_map(|part| part.trim().parse::<Layer>().ok())
        .collect()
}

fn parse_human_action(line: &str) -> Option<HumanAction> {
    let trimmed = line.trim();
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };
    match verb {
        "approve" => Some(HumanAction::Approve),
        "reject" => Some(HumanAction::Reject {
            reason: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "rerun" => Some(HumanAction::Rerun {
            rerun_dimensions: parse_layers(rest),
        }),
        "lock" => {
            let dimensions = parse_layers(rest);
            if dimensions.is_empty() {
                return None;
            }
            Some(HumanAction::LockDimensions { dimensions })
        }
        "accept" => Some(HumanAction::ForceAccept {
            candidate_id: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_verbs() {
        assert!(matches!(
            parse_human_action("approve\n"),
            Some(HumanAction::Approve)
        ));
        assert!(matches!(
            parse_human_action("reject"),
            Some(HumanAction::Reject { reason: None })
        ));
        assert!(parse_human_action("destroy").is_none());
    }

    #[test]
    fn test_parse_reject_with_reason() {
        match parse_human_action("reject composition is off brief") {
            Some(HumanAction::Reject { reason: Some(r) }) => {
                assert_eq!(r, "composition is off brief")
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_lock_dimensions() {
        match parse_human_action("lock L1, cultural_context") {
            Some(HumanAction::LockDimensions { dimensions }) => {
                assert_eq!(dimensions, vec![Layer::VisualForm, Layer::CulturalContext]);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
        assert!(parse_human_action("lock").is_none());
    }

    #[test]
    fn test_parse_force_accept() {
        match parse_human_action("accept cand-1003") {
            Some(HumanAction::ForceAccept {
                candidate_id: Some(id),
            }) => assert_eq!(id, "cand-1003"),
            other => panic!("unexpected parse: {:?}", other),
        }
    }
}
