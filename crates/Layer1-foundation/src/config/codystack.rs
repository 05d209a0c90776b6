//! CodyStack Config - 통합 설정
//!
//! 글로벌 설정 위에 프로젝트 설정을 병합한다.

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};

/// 설정 파일명
pub const CODYSTACK_CONFIG_FILE: &str = "config.json";

// ============================================================================
// CodyConfig (통합)
// ============================================================================

/// CodyStack 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodyConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 로그 레벨 (RUST_LOG가 없을 때 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// 플러그인 설정
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl Default for CodyConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: None,
            plugins: PluginsConfig::default(),
        }
    }
}

impl CodyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<CodyConfig>(CODYSTACK_CONFIG_FILE)? {
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) =
                project.load_optional::<CodyConfig>(CODYSTACK_CONFIG_FILE)?
            {
                config.merge(project_config);
            }
        }

        Ok(config)
    }

    /// 지정한 저장소에서 로드 (파일이 없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<CodyConfig>(CODYSTACK_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// 지정한 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(CODYSTACK_CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: CodyConfig) {
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self.plugins.merge(other.plugins);
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn auto_activate(mut self, plugin_id: impl Into<String>) -> Self {
        self.plugins.auto_activate.push(plugin_id.into());
        self
    }
}

// ============================================================================
// Plugins Config
// ============================================================================

/// 플러그인 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginsConfig {
    /// 시작 시 활성화할 플러그인 ID
    #[serde(default)]
    pub auto_activate: Vec<String>,

    /// 등록하지 않을 내장 플러그인 ID
    #[serde(default)]
    pub disabled: Vec<String>,

    /// 라이프사이클 훅 타임아웃 (ms). 없으면 무기한 대기
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_timeout_ms: Option<u64>,
}

impl PluginsConfig {
    fn merge(&mut self, other: PluginsConfig) {
        for id in other.auto_activate {
            if !self.auto_activate.contains(&id) {
                self.auto_activate.push(id);
            }
        }
        for id in other.disabled {
            if !self.disabled.contains(&id) {
                self.disabled.push(id);
            }
        }
        if other.hook_timeout_ms.is_some() {
            self.hook_timeout_ms = other.hook_timeout_ms;
        }
    }

    /// 내장 플러그인이 비활성화되어 있는지 확인
    pub fn is_disabled(&self, plugin_id: &str) -> bool {
        self.disabled.iter().any(|id| id == plugin_id)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> u32 {
    1
}
