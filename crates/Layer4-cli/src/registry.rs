//! 프로세스 기본 레지스트리
//!
//! 애플리케이션 전체에서 하나의 레지스트리만 쓴다. 라이브러리 크레이트는
//! 전역 인스턴스를 갖지 않으며, 여기서만 생성해 보관한다.

use codystack_core::{ConsoleHost, Error, PluginRegistry, RegistryConfig};
use codystack_foundation::CodyConfig;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

static DEFAULT_REGISTRY: OnceLock<PluginRegistry> = OnceLock::new();

/// 설정으로 레지스트리 생성 (비활성화된 내장 플러그인 제외)
pub fn build_registry(config: &CodyConfig) -> codystack_core::Result<PluginRegistry> {
    let registry = PluginRegistry::with_config(
        Arc::new(ConsoleHost::new()),
        RegistryConfig::from(&config.plugins),
    );
    let count = registry.register_builtins(&config.plugins.disabled)?;
    info!(builtins = count, "Plugin registry ready");
    Ok(registry)
}

/// 자동 활성화 목록 적용. 실패한 플러그인과 에러를 반환한다
pub async fn auto_activate(
    registry: &PluginRegistry,
    config: &CodyConfig,
) -> Vec<(String, Error)> {
    let mut failures = Vec::new();
    for id in &config.plugins.auto_activate {
        if let Err(e) = registry.activate(id).await {
            warn!(plugin_id = %id, error = %e, "Auto-activation failed");
            failures.push((id.clone(), e));
        }
    }
    failures
}

/// 기본 레지스트리 초기화. 이미 초기화되어 있으면 기존 인스턴스를 돌려준다
pub async fn init_default_registry(config: &CodyConfig) -> anyhow::Result<&'static PluginRegistry> {
    if let Some(registry) = DEFAULT_REGISTRY.get() {
        return Ok(registry);
    }

    let registry = build_registry(config)?;
    let registry = DEFAULT_REGISTRY.get_or_init(|| registry);

    auto_activate(registry, config).await;
    Ok(registry)
}

/// 기본 레지스트리 (초기화 전이면 None)
pub fn default_registry() -> Option<&'static PluginRegistry> {
    DEFAULT_REGISTRY.get()
}
