//! Plugin Host - 플러그인 컨텍스트가 위임하는 외부 협력자
//!
//! 알림, 모달, 에이전트 호출은 레지스트리 바깥(UI, AI 요청 레이어)의 책임이다.
//! `ConsoleHost`는 로그로만 전달하는 기본 구현이다.

use async_trait::async_trait;
use codystack_foundation::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};

/// 에이전트 호출 기본 응답
pub const AGENT_PLACEHOLDER_RESPONSE: &str = "Agent response placeholder";

// ============================================================================
// NotificationSeverity / LogLevel
// ============================================================================

/// 알림 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 플러그인 로그 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

// ============================================================================
// ModalRequest
// ============================================================================

/// 모달 표시 요청 (렌더링 가능한 설명)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// 기여된 View를 모달로 띄우는 경우
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
}

impl ModalRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            view_id: None,
        }
    }

    pub fn for_view(title: impl Into<String>, view_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: String::new(),
            view_id: Some(view_id.into()),
        }
    }
}

// ============================================================================
// PluginHost Trait
// ============================================================================

/// 호스트 협력자 트레이트
///
/// 모든 호출은 요청한 플러그인의 ID와 함께 전달된다.
#[async_trait]
pub trait PluginHost: Send + Sync {
    /// 알림 표시
    fn show_notification(&self, plugin_id: &str, message: &str, severity: NotificationSeverity);

    /// 모달 표시
    fn show_modal(&self, plugin_id: &str, modal: &ModalRequest) {
        debug!(plugin_id, title = %modal.title, "Modal requested but no modal sink is attached");
    }

    /// 에이전트 호출
    async fn invoke_agent(&self, plugin_id: &str, agent_id: &str, prompt: &str) -> Result<String> {
        debug!(
            plugin_id,
            agent_id,
            prompt_len = prompt.len(),
            "Agent invocation is not wired, returning placeholder"
        );
        Ok(AGENT_PLACEHOLDER_RESPONSE.to_string())
    }
}

/// 콘솔(로그) 기반 기본 호스트
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PluginHost for ConsoleHost {
    fn show_notification(&self, plugin_id: &str, message: &str, severity: NotificationSeverity) {
        match severity {
            NotificationSeverity::Error => {
                error!(target: "codystack::notification", "[{}] {}: {}", plugin_id, severity, message)
            }
            NotificationSeverity::Warning => {
                warn!(target: "codystack::notification", "[{}] {}: {}", plugin_id, severity, message)
            }
            NotificationSeverity::Info | NotificationSeverity::Success => {
                info!(target: "codystack::notification", "[{}] {}: {}", plugin_id, severity, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display() {
        assert_eq!(NotificationSeverity::Success.to_string(), "SUCCESS");
        assert_eq!(NotificationSeverity::default(), NotificationSeverity::Info);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[tokio::test]
    async fn test_console_host_agent_placeholder() {
        let host = ConsoleHost::new();
        let response = host.invoke_agent("arch", "architect", "hello").await.unwrap();
        assert_eq!(response, AGENT_PLACEHOLDER_RESPONSE);
    }
}
