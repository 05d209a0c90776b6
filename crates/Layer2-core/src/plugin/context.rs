//! Plugin Context - 라이프사이클 훅에 전달되는 기능 객체
//!
//! 플러그인이 전역 상태에 영향을 줄 수 있는 유일한 통로다.
//! 컨텍스트는 정확히 한 플러그인의 저장소와 ID를 가지며 레지스트리 내부 맵을 보지 못한다.

use super::command::{CommandOwner, CommandTable};
use super::contribution::Command;
use super::host::{LogLevel, ModalRequest, NotificationSeverity, PluginHost};
use codystack_foundation::{Error, Result};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};

/// 플러그인 전용 키-값 저장소
pub type PluginStorage = Arc<RwLock<HashMap<String, Value>>>;

/// 플러그인 컨텍스트
///
/// 복제해도 같은 저장소를 공유한다 (커맨드 핸들러에 넘기기 위함).
#[derive(Clone)]
pub struct PluginContext {
    plugin_id: Arc<str>,
    storage: PluginStorage,
    commands: Weak<CommandTable>,
    host: Arc<dyn PluginHost>,
}

impl PluginContext {
    /// 새 컨텍스트 생성
    ///
    /// 커맨드 테이블은 약한 참조로만 잡는다. 컨텍스트를 캡처한 핸들러가
    /// 테이블 안에 저장되므로 강한 참조면 순환이 생긴다.
    pub fn new(
        plugin_id: impl Into<String>,
        storage: PluginStorage,
        commands: &Arc<CommandTable>,
        host: Arc<dyn PluginHost>,
    ) -> Self {
        let plugin_id: String = plugin_id.into();
        Self {
            plugin_id: Arc::from(plugin_id),
            storage,
            commands: Arc::downgrade(commands),
            host,
        }
    }

    /// 소유 플러그인 ID
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    // ========================================================================
    // 상태 저장
    // ========================================================================

    /// 상태 조회
    pub fn get_state(&self, key: &str) -> Option<Value> {
        self.storage.read().get(key).cloned()
    }

    /// 상태 조회 (타입 변환). 없거나 타입이 맞지 않으면 None
    pub fn get_state_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_state(key)?;
        serde_json::from_value(value).ok()
    }

    /// 상태 저장
    pub fn set_state(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.storage.write().insert(key.into(), value.into());
    }

    /// 상태 삭제
    pub fn remove_state(&self, key: &str) -> Option<Value> {
        self.storage.write().remove(key)
    }

    // ========================================================================
    // UI 상호작용
    // ========================================================================

    /// 알림 표시
    pub fn show_notification(&self, message: impl AsRef<str>, severity: NotificationSeverity) {
        self.host
            .show_notification(&self.plugin_id, message.as_ref(), severity);
    }

    /// 모달 표시
    pub fn show_modal(&self, modal: ModalRequest) {
        self.host.show_modal(&self.plugin_id, &modal);
    }

    // ========================================================================
    // 커맨드
    // ========================================================================

    /// 커맨드 등록 (플러그인 활성 여부와 무관하게 즉시 반영, 덮어쓰기)
    pub fn register_command(&self, command: Command) -> Result<()> {
        let table = self.command_table()?;
        debug!(plugin_id = %self.plugin_id, command_id = %command.id, "Plugin registered command");
        table.set(command, CommandOwner::plugin(&*self.plugin_id));
        Ok(())
    }

    /// 커맨드 실행
    pub async fn execute_command(&self, command_id: &str) -> Result<()> {
        let table = self.command_table()?;
        table.execute(command_id).await
    }

    fn command_table(&self) -> Result<Arc<CommandTable>> {
        self.commands.upgrade().ok_or_else(|| {
            Error::Internal(format!(
                "command table for plugin {} is no longer available",
                self.plugin_id
            ))
        })
    }

    // ========================================================================
    // 에이전트
    // ========================================================================

    /// 에이전트 호출 (호스트에 위임)
    pub async fn invoke_agent(&self, agent_id: &str, prompt: &str) -> Result<String> {
        self.host.invoke_agent(&self.plugin_id, agent_id, prompt).await
    }

    // ========================================================================
    // 로깅
    // ========================================================================

    /// 플러그인 ID가 태그된 로그
    pub fn log(&self, message: impl AsRef<str>, level: LogLevel) {
        let message = message.as_ref();
        let plugin_id: &str = &self.plugin_id;
        match level {
            LogLevel::Debug => debug!(target: "codystack::plugin", plugin_id, "{}", message),
            LogLevel::Info => info!(target: "codystack::plugin", plugin_id, "{}", message),
            LogLevel::Warn => warn!(target: "codystack::plugin", plugin_id, "{}", message),
            LogLevel::Error => error!(target: "codystack::plugin", plugin_id, "{}", message),
        }
    }
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin_id", &self.plugin_id)
            .field("state_keys", &self.storage.read().len())
            .finish_non_exhaustive()
    }
}
