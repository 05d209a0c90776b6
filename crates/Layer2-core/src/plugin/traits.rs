//! Plugin traits - 핵심 플러그인 인터페이스와 검증

use super::context::PluginContext;
use super::contribution::PluginContributions;
use super::manifest::PluginMetadata;
use async_trait::async_trait;
use codystack_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Plugin Trait - 모든 플러그인이 구현해야 하는 인터페이스
// ============================================================================

/// 플러그인 트레이트
///
/// 라이프사이클 훅이 호출 가능하다는 조건은 타입 시스템이 보장한다.
/// 레지스트리 경계에서는 메타데이터만 `validate_plugin`으로 확인한다.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// 플러그인 메타데이터
    fn metadata(&self) -> &PluginMetadata;

    /// 기여 묶음 (활성 상태일 때만 반영)
    fn contributes(&self) -> Option<&PluginContributions> {
        None
    }

    /// 활성화 시 호출
    async fn on_activate(&self, ctx: &PluginContext) -> Result<()>;

    /// 비활성화 시 호출
    async fn on_deactivate(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// PluginStatus
// ============================================================================

/// 플러그인 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginStatus {
    /// 등록됨, 비활성
    Inactive,

    /// on_activate 실행 중
    Activating,

    /// 활성화됨
    Active,

    /// on_deactivate 실행 중
    Deactivating,

    /// on_deactivate 실패. 기여 항목은 아직 살아 있고 재시도 가능
    DeactivationFailed,
}

impl PluginStatus {
    /// 기여 항목이 커맨드 테이블에 살아 있는 상태인지
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active | Self::DeactivationFailed)
    }

    /// 훅이 실행 중인지
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Activating | Self::Deactivating)
    }
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::DeactivationFailed => write!(f, "deactivation_failed"),
        }
    }
}

// ============================================================================
// 검증
// ============================================================================

/// 메타데이터 필수 필드 검사 (id, name, version이 비어 있지 않아야 함)
///
/// 카테고리나 ID 형식 같은 의미 검증은 하지 않는다.
pub fn validate_metadata(metadata: &PluginMetadata) -> Result<()> {
    let fields = [
        ("id", &metadata.id),
        ("name", &metadata.name),
        ("version", &metadata.version),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(Error::InvalidShape(format!(
                "metadata.{} must be a non-empty string (plugin id: {:?})",
                field, metadata.id
            )));
        }
    }
    Ok(())
}

/// 플러그인이 최소 계약을 만족하는지 확인
pub fn validate_plugin(plugin: &dyn Plugin) -> bool {
    validate_metadata(plugin.metadata()).is_ok()
}

/// 동적 입력(JSON)에 대한 얕은 구조 검사
///
/// null이 아닌 객체이고, `metadata` 객체의 `id`/`name`/`version`이 문자열이면 true.
/// 기여 항목이나 카테고리 값은 보지 않는다.
pub fn validate_plugin_value(value: &Value) -> bool {
    let Some(metadata) = value.as_object().and_then(|obj| obj.get("metadata")) else {
        return false;
    };
    ["id", "name", "version"]
        .iter()
        .all(|field| metadata.get(field).map(Value::is_string).unwrap_or(false))
}

/// 동적 입력에서 메타데이터 추출 (얕은 검사 후 역직렬화)
pub fn metadata_from_value(value: &Value) -> Result<PluginMetadata> {
    if !validate_plugin_value(value) {
        return Err(Error::InvalidShape(format!(
            "expected an object with metadata.id/name/version strings, got {}",
            value
        )));
    }
    let metadata: PluginMetadata = serde_json::from_value(value["metadata"].clone())?;
    Ok(metadata)
}
