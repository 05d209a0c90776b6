//! # Plugin System
//!
//! CodyStack 확장 플러그인 시스템
//!
//! ## 개요
//!
//! 플러그인은 메타데이터, 두 개의 라이프사이클 훅, 선택적 기여 묶음으로 이루어진다.
//! 레지스트리가 유일한 라이프사이클 소유자이며 플러그인은 컨텍스트를 통해서만
//! 전역 상태(커맨드 테이블, 호스트 UI, 에이전트)에 접근한다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PluginRegistry                          │
//! │  ┌────────────┬────────────┬────────────────────┐          │
//! │  │ Plugin A   │ Plugin B   │ architect-agent    │          │
//! │  │ (Inactive) │ (Active)   │ (builtin)          │          │
//! │  └────────────┴────────────┴────────────────────┘          │
//! │        │ activate / deactivate        │ notify             │
//! │  ┌─────┴──────────────┐     ┌─────────┴─────────┐          │
//! │  │   PluginContext    │     │   Subscribers     │          │
//! │  │  - state (per id)  │     └───────────────────┘          │
//! │  │  - CommandTable ───┼──── command id -> (handler, owner) │
//! │  │  - PluginHost      │                                     │
//! │  └────────────────────┘                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let plugin = PluginBuilder::new(PluginMetadata::new("hello", "Hello", "1.0.0"))
//!     .on_activate(|ctx| async move {
//!         ctx.register_command(Command::new("hello.say", "Say Hello", || async { Ok(()) }))
//!     })
//!     .build()?;
//!
//! let registry = PluginRegistry::new();
//! registry.register(Arc::new(plugin))?;
//! registry.activate("hello").await?;
//! registry.execute_command("hello.say").await?;
//! ```

mod builder;
pub mod builtin;
mod command;
mod context;
mod contribution;
mod events;
mod host;
mod manifest;
mod registry;
mod traits;

pub use builder::{create_plugin, ActivateHook, DeactivateHook, FnPlugin, PluginBuilder, PluginHandlers};
pub use command::{CommandOwner, CommandTable};
pub use context::{PluginContext, PluginStorage};
pub use contribution::{
    AgentConfig, Command, CommandDescriptor, CommandFuture, CommandHandler, Contribution,
    ContributionDescriptors, PluginContributions, View, ViewLocation, WorkflowStep,
    WorkflowTemplate,
};
pub use events::{ListenerId, PluginListener, Subscription};
pub use host::{
    ConsoleHost, LogLevel, ModalRequest, NotificationSeverity, PluginHost,
    AGENT_PLACEHOLDER_RESPONSE,
};
pub use manifest::{
    CodyStackSection, ManifestAuthor, PluginAuthor, PluginCategory, PluginManifest,
    PluginMetadata,
};
pub use registry::{PluginInfo, PluginRegistry, RegistryConfig};
pub use traits::{
    metadata_from_value, validate_metadata, validate_plugin, validate_plugin_value, Plugin,
    PluginStatus,
};
