//! Architect Agent - 시스템 설계 에이전트 플러그인
//!
//! 세 개의 커맨드를 선언하고, 활성화 시 같은 ID로 실제 핸들러를 등록한다:
//! 1. architect.analyze - 프로젝트 구조 분석
//! 2. architect.diagram - 아키텍처 다이어그램 생성
//! 3. architect.suggest-patterns - 디자인 패턴 추천
//!
//! 선언은 목록 표시용이고, 핸들러는 컨텍스트를 캡처해야 하므로 훅에서 등록한다.

use crate::plugin::builder::{FnPlugin, PluginBuilder};
use crate::plugin::context::PluginContext;
use crate::plugin::contribution::{AgentConfig, Command};
use crate::plugin::host::{LogLevel, NotificationSeverity};
use crate::plugin::manifest::{PluginAuthor, PluginCategory, PluginMetadata};
use codystack_foundation::Result;
use tracing::info;

/// 플러그인 ID
pub const ARCHITECT_AGENT_ID: &str = "architect-agent";

const AGENT_ID: &str = "architect";

const SYSTEM_PROMPT: &str = "You are an expert software architect. Your role is to:
- Analyze project structures and suggest improvements
- Recommend appropriate design patterns
- Create clear architecture diagrams
- Identify potential scalability issues
- Suggest optimal folder structures";

const ANALYZE: (&str, &str, &str) = (
    "architect.analyze",
    "Analyze Project Structure",
    "Scan and analyze the current project structure",
);
const DIAGRAM: (&str, &str, &str) = (
    "architect.diagram",
    "Generate Architecture Diagram",
    "Create a visual diagram of the system architecture",
);
const SUGGEST_PATTERNS: (&str, &str, &str) = (
    "architect.suggest-patterns",
    "Suggest Design Patterns",
    "Recommend design patterns for the current codebase",
);

const SUGGESTED_PATTERNS: [&str; 3] = ["Repository Pattern", "Factory Pattern", "Observer Pattern"];

fn metadata() -> PluginMetadata {
    PluginMetadata::new(ARCHITECT_AGENT_ID, "Architect Agent", "1.0.0")
        .with_description(
            "System design expert that creates architecture diagrams, suggests patterns, and plans project structure.",
        )
        .with_category(PluginCategory::AiAgents)
        .with_author(PluginAuthor::new("CodyStack Core").with_url("https://github.com/LebToki/CodyStack"))
        .with_icon("🏗️")
        .with_keywords(["architecture", "design", "patterns", "diagrams"])
}

fn agent() -> AgentConfig {
    AgentConfig::new(
        AGENT_ID,
        "Architect",
        "System design, pattern selection, dependency analysis",
        "claude-3.5-sonnet",
    )
    .with_system_prompt(SYSTEM_PROMPT)
    .with_temperature(0.3)
    .with_max_tokens(4096)
}

/// Architect Agent 플러그인 생성
pub fn architect_agent() -> Result<FnPlugin> {
    PluginBuilder::new(metadata())
        .on_activate(|ctx| async move { activate(ctx) })
        .on_deactivate(|| async {
            info!(plugin_id = ARCHITECT_AGENT_ID, "Architect Agent deactivated");
            Ok(())
        })
        .contribute(declared(ANALYZE))
        .contribute(declared(DIAGRAM))
        .contribute(declared(SUGGEST_PATTERNS))
        .contribute(agent())
        .build()
}

fn declared((id, title, description): (&str, &str, &str)) -> Command {
    Command::noop(id, title).with_description(description)
}

fn activate(ctx: PluginContext) -> Result<()> {
    ctx.log("Architect Agent activated!", LogLevel::Info);

    let handler_ctx = ctx.clone();
    ctx.register_command(
        Command::new(ANALYZE.0, ANALYZE.1, move || {
            let ctx = handler_ctx.clone();
            async move { analyze(&ctx).await }
        })
        .with_description(ANALYZE.2),
    )?;

    let handler_ctx = ctx.clone();
    ctx.register_command(
        Command::new(DIAGRAM.0, DIAGRAM.1, move || {
            let ctx = handler_ctx.clone();
            async move { diagram(&ctx).await }
        })
        .with_description(DIAGRAM.2),
    )?;

    let handler_ctx = ctx.clone();
    ctx.register_command(
        Command::new(SUGGEST_PATTERNS.0, SUGGEST_PATTERNS.1, move || {
            let ctx = handler_ctx.clone();
            async move {
                suggest_patterns(&ctx);
                Ok(())
            }
        })
        .with_description(SUGGEST_PATTERNS.2),
    )?;

    Ok(())
}

// ============================================================================
// 커맨드 핸들러
// ============================================================================

async fn analyze(ctx: &PluginContext) -> Result<()> {
    ctx.show_notification("Analyzing project structure...", NotificationSeverity::Info);
    let report = ctx
        .invoke_agent(AGENT_ID, "Analyze the current project structure")
        .await?;
    ctx.set_state("lastAnalysis", report);
    bump_run_count(ctx, "analyze");
    ctx.show_notification("Analysis complete!", NotificationSeverity::Success);
    Ok(())
}

async fn diagram(ctx: &PluginContext) -> Result<()> {
    ctx.show_notification("Generating architecture diagram...", NotificationSeverity::Info);
    let diagram = ctx
        .invoke_agent(AGENT_ID, "Generate a Mermaid diagram of the system architecture")
        .await?;
    ctx.set_state("lastDiagram", diagram);
    bump_run_count(ctx, "diagram");
    ctx.show_notification("Diagram generated!", NotificationSeverity::Success);
    Ok(())
}

fn suggest_patterns(ctx: &PluginContext) {
    let patterns = SUGGESTED_PATTERNS.to_vec();
    ctx.log(
        format!("Suggested patterns: {}", patterns.join(", ")),
        LogLevel::Info,
    );
    ctx.set_state("lastPatterns", patterns);
    bump_run_count(ctx, "suggest-patterns");
}

fn bump_run_count(ctx: &PluginContext, command: &str) {
    let key = format!("runs.{}", command);
    let count = ctx.get_state_as::<u64>(&key).unwrap_or(0) + 1;
    ctx.set_state(key, count);
}
