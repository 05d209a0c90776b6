//! Error types for CodyStack
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// CodyStack 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 플러그인 관련
    // ========================================================================
    #[error("Invalid plugin structure: {0}")]
    InvalidShape(String),

    #[error("Plugin already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Plugin is busy: {0}")]
    Busy(String),

    #[error("Plugin {plugin} {hook} hook failed: {message}")]
    HookFailure {
        plugin: String,
        hook: String,
        message: String,
    },

    // ========================================================================
    // 커맨드 관련
    // ========================================================================
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Plugin not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 재시도 가능한 에러인지 확인
    ///
    /// 레지스트리는 재시도를 하지 않는다. 호출자가 판단할 때 사용.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::Busy(_) | Error::HookFailure { .. }
        )
    }

    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidShape(_)
                | Error::AlreadyRegistered(_)
                | Error::NotFound(_)
                | Error::CommandNotFound(_)
                | Error::Validation(_)
                | Error::Busy(_)
        )
    }

    /// Hook 실패 에러 생성 헬퍼
    pub fn hook_failure(
        plugin: impl Into<String>,
        hook: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::HookFailure {
            plugin: plugin.into(),
            hook: hook.into(),
            message: message.into(),
        }
    }

    /// 커맨드 실행 에러 생성 헬퍼
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}
