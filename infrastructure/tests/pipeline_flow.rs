//! End-to-end pipeline tests over the offline studio adapters.

use async_trait::async_trait;
use atelier_application::ports::{
    DraftError, DraftPort, DraftRequest, RefineRequest, ScoutError, ScoutPort,
};
use atelier_application::{
    AgentConfig, AgentRuntime, CriticEngine, CritiqueOutput, PipelineConfig,
    PipelineOrchestrator, RunRegistry,
};
use atelier_domain::{
    AnalysisBoard, Candidate, CulturalTradition, EvidencePack, HumanAction, Layer,
    PipelineEvent, PipelineInput, QueenAction, Stage, StageStatus,
};
use atelier_infrastructure::{
    CriticToolbox, FsArchivist, FsCheckpointStore, LayerModelRouter, ScriptedGateway, StudioDraft,
    StudioScout,
};
use std::path::Path;
use std::sync::Arc;

fn offline_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    // Terminal on the first round either way: accept on a gate pass,
    // downgrade otherwise.
    config.queen.max_rounds = 1;
    config.queen.downgrade_threshold = 0.0;
    config
}

async fn build_orchestrator(
    root: &Path,
    config: PipelineConfig,
    with_agent: bool,
) -> Arc<PipelineOrchestrator> {
    let scout = Arc::new(StudioScout::new());
    let draft = Arc::new(StudioDraft::default());
    let agent = if with_agent {
        let board = AnalysisBoard::new();
        let evidence = scout
            .gather_evidence("winter heron", CulturalTradition::Ukiyoe, &[])
            .await
            .expect("offline scout cannot fail");
        let gateway = Arc::new(ScriptedGateway::always_submitting(
            0.85,
            0.9,
            "confident reading of the motif",
        ));
        let toolbox = Arc::new(CriticToolbox::new(evidence, board));
        let router = Arc::new(LayerModelRouter::new(
            atelier_domain::ModelChoice::new(atelier_domain::Model::Gemini3Pro, 0.02),
            atelier_domain::ModelChoice::new(atelier_domain::Model::ClaudeHaiku45, 0.005),
            config.cost.llm_budget_usd,
        ));
        Some(Arc::new(AgentRuntime::new(
            gateway,
            toolbox,
            router,
            AgentConfig::default(),
        )))
    } else {
        None
    };

    let critic = Arc::new(CriticEngine::new(
        agent,
        config.critic.clone(),
        config.weights.clone(),
        config.gate,
    ));
    Arc::new(PipelineOrchestrator::new(
        scout,
        draft,
        critic,
        Arc::new(FsArchivist::new(root.join("archive"))),
        Arc::new(FsCheckpointStore::new(root.join("checkpoints"))),
        Arc::new(RunRegistry::new()),
        config,
    ))
}

fn input(task_id: &str) -> PipelineInput {
    PipelineInput::new(task_id, "winter heron at dusk", CulturalTradition::Ukiyoe)
}

#[tokio::test]
async fn test_offline_run_completes_and_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = build_orchestrator(dir.path(), offline_config(), true).await;

    let handle = orchestrator.run(input("run-1"));
    let terminal = handle.run_to_completion().await.expect("terminal event");

    match terminal {
        PipelineEvent::PipelineCompleted {
            final_decision,
            total_rounds,
            ..
        } => {
            assert!(matches!(
                final_decision,
                QueenAction::Accept | QueenAction::Downgrade
            ));
            assert_eq!(total_rounds, 1);
        }
        other => panic!("expected completion, got {:?}", other),
    }

    let checkpoints = dir.path().join("checkpoints").join("run-1");
    for stage in ["scout", "draft", "critic", "queen"] {
        assert!(
            checkpoints.join(format!("{stage}.json")).exists(),
            "missing {stage} checkpoint"
        );
    }
    assert!(checkpoints.join("output.json").exists());

    let index: serde_json::Value = serde_json::from_slice(
        &tokio::fs::read(dir.path().join("checkpoints").join("index.json"))
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(index["run-1"]["status"], "completed");

    // Accept and downgrade both archive.
    assert!(dir.path().join("archive").join("run-1.json").exists());
}

#[tokio::test]
async fn test_image_budget_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::default();
    config.candidates_per_round = 1;
    config.cost.cost_per_image = Some(0.10);
    config.cost.image_ceiling_usd = 0.50;
    config.queen.max_rounds = 10;
    // Unreachable gate keeps the queen rerunning until the money runs out.
    config.gate.pass_threshold = 0.99;

    let orchestrator = build_orchestrator(dir.path(), config, false).await;
    let mut handle = orchestrator.run(input("run-budget"));

    let mut draft_rounds = 0u32;
    let mut terminal = None;
    while let Some(event) = handle.next_event().await {
        match &event {
            PipelineEvent::StageCompleted {
                stage: Stage::Draft,
                ..
            } => draft_rounds += 1,
            _ => {}
        }
        if event.is_terminal() {
            terminal = Some(event);
        }
    }

    // Four rounds at 0.10 USD are affordable; the fifth hits the ceiling.
    assert_eq!(draft_rounds, 5);
    match terminal.expect("terminal event") {
        PipelineEvent::PipelineFailed { error, .. } => {
            assert!(error.contains("budget"), "unexpected error: {error}");
        }
        other => panic!("expected failure, got {:?}", other),
    }

    let index: serde_json::Value = serde_json::from_slice(
        &tokio::fs::read(dir.path().join("checkpoints").join("index.json"))
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(index["run-budget"]["status"], "failed");
}

struct RefusingScout;

#[async_trait]
impl ScoutPort for RefusingScout {
    async fn gather_evidence(
        &self,
        _subject: &str,
        _tradition: CulturalTradition,
        _extra_queries: &[String],
    ) -> Result<EvidencePack, ScoutError> {
        Err(ScoutError::GatherFailed("scout must not run".to_string()))
    }
}

struct RefusingDraft;

#[async_trait]
impl DraftPort for RefusingDraft {
    async fn generate(&self, _request: &DraftRequest) -> Result<Vec<Candidate>, DraftError> {
        Err(DraftError::GenerationFailed("draft must not run".to_string()))
    }

    async fn refine(&self, request: &RefineRequest) -> Result<Candidate, DraftError> {
        Err(DraftError::RefinementFailed {
            candidate_id: request.candidate.id.clone(),
            message: "draft must not run".to_string(),
        })
    }
}

#[tokio::test]
async fn test_resume_from_critic_skips_earlier_stages() {
    let dir = tempfile::tempdir().unwrap();

    // First run populates the checkpoints.
    let orchestrator = build_orchestrator(dir.path(), offline_config(), false).await;
    let handle = orchestrator.run(input("run-resume"));
    assert!(matches!(
        handle.run_to_completion().await,
        Some(PipelineEvent::PipelineCompleted { .. })
    ));

    let draft_before = tokio::fs::read(
        dir.path()
            .join("checkpoints")
            .join("run-resume")
            .join("draft.json"),
    )
    .await
    .unwrap();

    // Second orchestrator can only satisfy the run by loading checkpoints.
    let critic = Arc::new(CriticEngine::new(
        None,
        offline_config().critic.clone(),
        offline_config().weights.clone(),
        offline_config().gate,
    ));
    let resumed = Arc::new(PipelineOrchestrator::new(
        Arc::new(RefusingScout),
        Arc::new(RefusingDraft),
        critic,
        Arc::new(FsArchivist::new(dir.path().join("archive"))),
        Arc::new(FsCheckpointStore::new(dir.path().join("checkpoints"))),
        Arc::new(RunRegistry::new()),
        offline_config(),
    ));

    let mut handle = resumed.run(input("run-resume").with_resume_from(Stage::Critic));
    let mut skipped = Vec::new();
    let mut executed = Vec::new();
    let mut terminal = None;
    while let Some(event) = handle.next_event().await {
        match &event {
            PipelineEvent::StageSkipped { result, .. } => {
                assert_eq!(result.status, StageStatus::Skipped);
                skipped.push(result.stage);
            }
            PipelineEvent::StageCompleted { stage, .. } => executed.push(*stage),
            _ => {}
        }
        if event.is_terminal() {
            terminal = Some(event);
        }
    }
    assert!(matches!(terminal, Some(PipelineEvent::PipelineCompleted { .. })));

    // The restored stages are reported as skipped, never as completed.
    assert_eq!(skipped, vec![Stage::Scout, Stage::Draft]);
    assert!(!executed.contains(&Stage::Scout));
    assert!(!executed.contains(&Stage::Draft));
    assert!(executed.contains(&Stage::Critic));

    // Restored stages left their checkpoints untouched.
    let draft_after = tokio::fs::read(
        dir.path()
            .join("checkpoints")
            .join("run-resume")
            .join("draft.json"),
    )
    .await
    .unwrap();
    assert_eq!(draft_before, draft_after);
}

#[tokio::test]
async fn test_resume_without_prerequisites_fails() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = build_orchestrator(dir.path(), offline_config(), false).await;

    let handle = orchestrator.run(input("run-cold").with_resume_from(Stage::Queen));
    match handle.run_to_completion().await.expect("terminal event") {
        PipelineEvent::PipelineFailed {
            error,
            stages_completed,
            ..
        } => {
            assert!(error.contains("missing checkpoint"), "got: {error}");
            assert!(stages_completed.is_empty());
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_hitl_timeout_proceeds_with_original_decision() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config();
    config.hitl.enabled = true;
    config.hitl.timeout_secs = 0;

    let orchestrator = build_orchestrator(dir.path(), config, false).await;
    let mut handle = orchestrator.run(input("run-hitl-timeout"));

    let mut saw_required = false;
    let mut saw_received = false;
    let mut terminal = None;
    while let Some(event) = handle.next_event().await {
        match &event {
            PipelineEvent::HumanRequired { .. } => saw_required = true,
            PipelineEvent::HumanReceived { .. } => saw_received = true,
            _ => {}
        }
        if event.is_terminal() {
            terminal = Some(event);
        }
    }

    assert!(saw_required);
    assert!(!saw_received, "a timeout must not synthesize an action");
    assert!(matches!(
        terminal,
        Some(PipelineEvent::PipelineCompleted { .. })
    ));
}

#[tokio::test]
async fn test_hitl_reject_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config();
    config.hitl.enabled = true;
    config.hitl.timeout_secs = 30;

    let orchestrator = build_orchestrator(dir.path(), config, false).await;
    let mut handle = orchestrator.run(input("run-hitl-reject"));

    let mut terminal = None;
    while let Some(event) = handle.next_event().await {
        if matches!(event, PipelineEvent::HumanRequired { .. }) {
            assert!(orchestrator.submit_action(
                "run-hitl-reject",
                HumanAction::Reject {
                    reason: Some("off brief".to_string()),
                },
            ));
        }
        if event.is_terminal() {
            terminal = Some(event);
        }
    }

    match terminal.expect("terminal event") {
        PipelineEvent::PipelineCompleted { final_decision, .. } => {
            assert_eq!(final_decision, QueenAction::Stop);
        }
        other => panic!("expected completion, got {:?}", other),
    }
    // Stopped runs are not archived.
    assert!(!dir.path().join("archive").join("run-hitl-reject.json").exists());
}

#[tokio::test]
async fn test_hitl_locked_dimension_survives_the_next_round() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config();
    config.queen.max_rounds = 2;
    // Gate never passes, so round one ends in a rerun decision.
    config.gate.pass_threshold = 0.99;
    config.hitl.enabled = true;
    config.hitl.timeout_secs = 30;

    let orchestrator = build_orchestrator(dir.path(), config, false).await;
    let mut handle = orchestrator.run(input("run-hitl-lock"));

    let mut round = 0;
    while let Some(event) = handle.next_event().await {
        if matches!(event, PipelineEvent::HumanRequired { .. }) {
            round += 1;
            let action = if round == 1 {
                HumanAction::LockDimensions {
                    dimensions: vec![Layer::VisualForm],
                }
            } else {
                HumanAction::Approve
            };
            assert!(orchestrator.submit_action("run-hitl-lock", action));
        }
    }

    let doc: serde_json::Value = serde_json::from_slice(
        &tokio::fs::read(
            dir.path()
                .join("checkpoints")
                .join("run-hitl-lock")
                .join("critic.json"),
        )
        .await
        .unwrap(),
    )
    .unwrap();
    assert_eq!(doc["round"], 2);
    let critique: CritiqueOutput = serde_json::from_value(doc["critique"].clone()).unwrap();
    let top = critique.scores.first().expect("a retained candidate");
    let dim = top.dimension(Layer::VisualForm).expect("visual form scored");
    assert!(
        dim.rationale.ends_with("(hitl_preserved)"),
        "locked dimension was re-scored: {}",
        dim.rationale
    );
}
