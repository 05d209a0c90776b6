//! codystack-core: Plugin Runtime for CodyStack
//!
//! Layer2 - 플러그인 레지스트리와 확장 계약
//!
//! # 주요 모듈
//!
//! - `plugin`: 플러그인 계약, 컨텍스트, 커맨드 테이블, 레지스트리, 내장 플러그인
//!
//! # 사용 예시
//!
//! ```ignore
//! use codystack_core::{ConsoleHost, PluginRegistry, RegistryConfig};
//!
//! let registry = PluginRegistry::with_builtins(Arc::new(ConsoleHost::new()), RegistryConfig::default())?;
//! registry.activate("architect-agent").await?;
//! registry.execute_command("architect.analyze").await?;
//! ```

pub mod plugin;

// Re-exports: Plugin
pub use plugin::{
    create_plugin,
    // Validation
    validate_plugin,
    validate_plugin_value,
    // Contributions
    AgentConfig,
    Command,
    CommandDescriptor,
    CommandOwner,
    CommandTable,
    ConsoleHost,
    Contribution,
    FnPlugin,
    LogLevel,
    ModalRequest,
    NotificationSeverity,
    // Traits
    Plugin,
    PluginAuthor,
    PluginBuilder,
    PluginCategory,
    PluginContext,
    PluginContributions,
    PluginHandlers,
    PluginHost,
    PluginInfo,
    PluginManifest,
    PluginMetadata,
    // Registry
    PluginRegistry,
    PluginStatus,
    RegistryConfig,
    Subscription,
    View,
    ViewLocation,
    WorkflowStep,
    WorkflowTemplate,
};

// Layer1 re-exports
pub use codystack_foundation::{Error, Result};

/// Layer2 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
