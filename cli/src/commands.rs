//! Subcommand implementations.

use anyhow::{Context, Result, bail};
use roundtable_application::{
    Coordinator, DiscussionEngine, InboundEvent, ReportStore, TranscriptLogger,
    ports::completion::CompletionGateway,
};
use roundtable_domain::{
    DiscussionAgent, DiscussionEvent, DiscussionPrompts, ParticipantId, ReportKind,
};
use roundtable_infrastructure::{
    ConsoleDelivery, FileConfig, FileReportStore, JsonlTranscriptLogger, OpenAiCompletionGateway,
    OpenAiConfig, ScriptedCompletionGateway,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One line of a simulation script.
#[derive(Debug, Deserialize)]
struct ScriptEvent {
    user: String,
    text: String,
}

/// Build the completion gateway: the real API when a key is configured,
/// canned replies when `--scripted`.
fn build_gateway(config: &FileConfig, scripted: bool) -> Result<Arc<dyn CompletionGateway>> {
    if scripted {
        return Ok(Arc::new(ScriptedCompletionGateway::new()));
    }
    let Ok(api_key) = std::env::var(&config.openai.api_key_env) else {
        bail!(
            "{} is not set; pass --scripted for an offline run",
            config.openai.api_key_env
        );
    };
    let mut openai = OpenAiConfig::new(api_key);
    openai.model = config.openai.model.clone();
    openai.temperature = config.openai.temperature;
    openai.max_tokens = config.openai.max_tokens;
    openai.timeout = Duration::from_secs(config.openai.timeout_secs);
    openai.base_url = config.openai.base_url.clone();
    Ok(Arc::new(OpenAiCompletionGateway::new(openai)?))
}

/// `roundtable simulate`: feed scripted events through the coordinator.
pub async fn simulate(
    config: &FileConfig,
    script: &Path,
    scripted: bool,
    transcript: Option<PathBuf>,
) -> Result<()> {
    let gateway = build_gateway(config, scripted)?;
    let delivery = Arc::new(ConsoleDelivery::new());
    let store = Arc::new(FileReportStore::new(&config.reports.dir)?);

    let mut coordinator = Coordinator::new(gateway, delivery, store)
        .with_discussion_config(config.discussion.to_domain())
        .with_language(&config.slack.voice_language);
    if let Some(path) = transcript
        && let Some(logger) = JsonlTranscriptLogger::new(&path)
    {
        let logger: Arc<dyn TranscriptLogger> = Arc::new(logger);
        coordinator = coordinator.with_transcript_logger(logger);
        info!(path = %path.display(), "transcript logging enabled");
    }

    let contents = std::fs::read_to_string(script)
        .with_context(|| format!("reading script {}", script.display()))?;

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: ScriptEvent = serde_json::from_str(line)
            .with_context(|| format!("parsing script line {}", line_no + 1))?;
        info!(user = %event.user, "processing scripted event");

        let inbound = InboundEvent::text_only(ParticipantId::new(event.user), event.text);
        if let Err(err) = coordinator.handle_event(inbound).await {
            // One bad event aborts its own transition only; the script
            // carries on, mirroring live operation.
            eprintln!("event on line {} failed: {}", line_no + 1, err);
        }
    }

    Ok(())
}

/// `roundtable discuss`: run the engine over persisted reports.
pub async fn discuss(
    config: &FileConfig,
    participants: &[String],
    topic: Option<String>,
    turns: Option<usize>,
    scripted: bool,
) -> Result<()> {
    let gateway = build_gateway(config, scripted)?;
    let store = FileReportStore::new(&config.reports.dir)?;

    let mut agents = Vec::new();
    for name in participants {
        let report = store
            .latest(ReportKind::TeamMember, Some(name))
            .await?
            .with_context(|| format!("no team-member report on file for {}", name))?;
        agents.push(DiscussionAgent::new(
            name,
            format!("representing {}'s perspective", name),
            report,
        ));
    }

    let initial_prompt = match topic {
        Some(topic) => topic,
        None => {
            let report = store
                .latest(ReportKind::Leadership, None)
                .await?
                .context("no leadership report on file; pass --topic instead")?;
            DiscussionPrompts::initial_prompt(&report)
        }
    };

    let mut discussion = config.discussion.to_domain();
    if let Some(turns) = turns {
        discussion = discussion.with_turns(turns);
    }

    println!("Discussion topic: {}\n", initial_prompt);

    let engine = DiscussionEngine::new(gateway, agents, discussion)?;
    let mut events = engine.spawn(initial_prompt);
    while let Some(event) = events.recv().await {
        match event {
            DiscussionEvent::Turn {
                turn_index,
                agent_name,
                response,
            } => {
                println!("--- turn {} | {} ---", turn_index + 1, agent_name);
                println!("{}\n", response);
            }
            DiscussionEvent::Summary { agent_name, summary } => {
                println!("=== summary (for {}) ===", agent_name);
                println!("{}\n", summary);
            }
            DiscussionEvent::Preparation {
                agent_name,
                preparation,
            } => {
                println!("=== preparation for {} ===", agent_name);
                println!("{}\n", preparation);
            }
        }
    }

    Ok(())
}
