//! Plugin Contributions - 플러그인이 호스트에 제공하는 항목
//!
//! Command만 실행 가능한 핸들러를 가지며, 나머지(View, Agent, Workflow)는
//! 호스트 UI가 소비하는 선언적 레코드다.

use codystack_foundation::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ============================================================================
// Command
// ============================================================================

/// 커맨드 핸들러가 반환하는 Future
pub type CommandFuture = BoxFuture<'static, Result<()>>;

/// 인자 없는 (비동기) 커맨드 핸들러
pub type CommandHandler = Arc<dyn Fn() -> CommandFuture + Send + Sync>;

/// 실행 가능한 커맨드
#[derive(Clone)]
pub struct Command {
    /// 커맨드 ID (커맨드 테이블에서 고유)
    pub id: String,

    /// 표시 제목
    pub title: String,

    /// 설명
    pub description: Option<String>,

    /// 단축키
    pub keybinding: Option<String>,

    handler: CommandHandler,
}

impl Command {
    /// 새 커맨드 생성
    pub fn new<F, Fut>(id: impl Into<String>, title: impl Into<String>, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let handler: CommandHandler = Arc::new(move || handler().boxed());
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            keybinding: None,
            handler,
        }
    }

    /// 아무 것도 하지 않는 커맨드
    pub fn noop(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, || async { Ok(()) })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_keybinding(mut self, keybinding: impl Into<String>) -> Self {
        self.keybinding = Some(keybinding.into());
        self
    }

    /// 핸들러 실행
    pub async fn run(&self) -> Result<()> {
        (self.handler)().await
    }

    /// 핸들러를 제외한 직렬화 가능한 정보
    pub fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            keybinding: self.keybinding.clone(),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("keybinding", &self.keybinding)
            .finish_non_exhaustive()
    }
}

/// 커맨드 메타데이터 (핸들러 없음)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keybinding: Option<String>,
}

// ============================================================================
// View
// ============================================================================

/// View 마운트 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewLocation {
    Sidebar,
    Panel,
    Modal,
}

/// 호스트 UI에 마운트되는 View
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub location: ViewLocation,
}

impl View {
    pub fn new(id: impl Into<String>, title: impl Into<String>, location: ViewLocation) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: None,
            location,
        }
    }
}

// ============================================================================
// Agent / Workflow
// ============================================================================

/// 에이전트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl AgentConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        specialty: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialty: specialty.into(),
            model: model.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// 워크플로우 단계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub agent_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_approval: Option<bool>,
    /// 단계 타임아웃 (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// 워크플로우 템플릿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

// ============================================================================
// Contribution / PluginContributions
// ============================================================================

/// 단일 기여 항목
#[derive(Debug, Clone)]
pub enum Contribution {
    Command(Command),
    View(View),
    Agent(AgentConfig),
    Workflow(WorkflowTemplate),
}

impl From<Command> for Contribution {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl From<View> for Contribution {
    fn from(view: View) -> Self {
        Self::View(view)
    }
}

impl From<AgentConfig> for Contribution {
    fn from(agent: AgentConfig) -> Self {
        Self::Agent(agent)
    }
}

impl From<WorkflowTemplate> for Contribution {
    fn from(workflow: WorkflowTemplate) -> Self {
        Self::Workflow(workflow)
    }
}

/// 플러그인 기여 묶음
///
/// 소유 플러그인이 활성 상태일 때만 공유 테이블에 올라간다.
#[derive(Debug, Clone, Default)]
pub struct PluginContributions {
    pub commands: Vec<Command>,
    pub views: Vec<View>,
    pub agents: Vec<AgentConfig>,
    pub workflows: Vec<WorkflowTemplate>,
    pub settings: Map<String, Value>,
}

impl PluginContributions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기여 항목 추가
    pub fn push(&mut self, contribution: impl Into<Contribution>) {
        match contribution.into() {
            Contribution::Command(command) => self.commands.push(command),
            Contribution::View(view) => self.views.push(view),
            Contribution::Agent(agent) => self.agents.push(agent),
            Contribution::Workflow(workflow) => self.workflows.push(workflow),
        }
    }

    /// 빌더 패턴: 기여 항목 추가
    pub fn with(mut self, contribution: impl Into<Contribution>) -> Self {
        self.push(contribution);
        self
    }

    /// 빌더 패턴: 설정 기본값 추가
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
            && self.views.is_empty()
            && self.agents.is_empty()
            && self.workflows.is_empty()
            && self.settings.is_empty()
    }

    /// 핸들러를 제외한 선언적 표현
    pub fn descriptors(&self) -> ContributionDescriptors {
        ContributionDescriptors {
            commands: self.commands.iter().map(Command::descriptor).collect(),
            views: self.views.clone(),
            agents: self.agents.clone(),
            workflows: self.workflows.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// 직렬화 가능한 기여 정보 (매니페스트, 마켓플레이스 표시용)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionDescriptors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<View>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workflows: Vec<WorkflowTemplate>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}
