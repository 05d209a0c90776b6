//! Plugin Registry - 플러그인 라이프사이클의 유일한 소유자
//!
//! 상태 전이:
//!
//! ```text
//! (미등록) --register--> Inactive --activate--> Activating --ok--> Active
//!                          ^  ^                     |                 |
//!                          |  +-------- fail -------+            deactivate
//!                          |                                          v
//!                          +------------- ok ------------------ Deactivating
//!                                                                     | fail
//!                                                                     v
//!                                                             DeactivationFailed
//! ```
//!
//! 훅 실행 중에는 잠금을 잡지 않는다. 같은 플러그인에 대한 전이가 진행 중이면
//! 다른 전이 요청은 `Busy`로 거절된다.

use super::builtin;
use super::command::{CommandOwner, CommandTable};
use super::context::{PluginContext, PluginStorage};
use super::contribution::{CommandDescriptor, ContributionDescriptors};
use super::events::{ListenerSet, Subscription};
use super::host::{ConsoleHost, PluginHost};
use super::manifest::PluginMetadata;
use super::traits::{validate_metadata, Plugin, PluginStatus};
use chrono::{DateTime, Utc};
use codystack_foundation::{Error, PluginsConfig, Result};
use futures::FutureExt;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// ============================================================================
// RegistryConfig
// ============================================================================

/// 레지스트리 설정
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// 라이프사이클 훅 타임아웃. None이면 무기한 대기
    pub hook_timeout: Option<Duration>,
}

impl RegistryConfig {
    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout = Some(timeout);
        self
    }
}

impl From<&PluginsConfig> for RegistryConfig {
    fn from(config: &PluginsConfig) -> Self {
        Self {
            hook_timeout: config.hook_timeout_ms.map(Duration::from_millis),
        }
    }
}

// ============================================================================
// PluginState / PluginInfo
// ============================================================================

/// 레지스트리 내부 플러그인 상태
struct PluginState {
    plugin: Arc<dyn Plugin>,
    status: PluginStatus,
    context: PluginContext,
    registered_at: DateTime<Utc>,
    load_order: usize,
}

/// 플러그인 정보 스냅샷
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub metadata: PluginMetadata,
    pub status: PluginStatus,
    pub registered_at: DateTime<Utc>,
    /// 현재 이 플러그인이 소유한 커맨드 ID
    pub commands: Vec<String>,
    pub contributes: ContributionDescriptors,
}

#[derive(Clone, Copy)]
enum Hook {
    Activate,
    Deactivate,
}

impl Hook {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "on_activate",
            Self::Deactivate => "on_deactivate",
        }
    }
}

// ============================================================================
// PluginRegistry
// ============================================================================

/// 플러그인 레지스트리
pub struct PluginRegistry {
    /// 플러그인 저장소 (ID -> PluginState)
    plugins: RwLock<HashMap<String, PluginState>>,

    /// 공유 커맨드 테이블
    commands: Arc<CommandTable>,

    /// 변경 구독자
    listeners: ListenerSet,

    /// 외부 협력자 (알림, 모달, 에이전트)
    host: Arc<dyn PluginHost>,

    config: RegistryConfig,

    /// 로드 카운터
    load_counter: AtomicUsize,
}

impl PluginRegistry {
    /// 콘솔 호스트로 새 레지스트리 생성
    pub fn new() -> Self {
        Self::with_host(Arc::new(ConsoleHost::new()))
    }

    /// 호스트 지정
    pub fn with_host(host: Arc<dyn PluginHost>) -> Self {
        Self::with_config(host, RegistryConfig::default())
    }

    /// 호스트 + 설정 지정
    pub fn with_config(host: Arc<dyn PluginHost>, config: RegistryConfig) -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
            commands: Arc::new(CommandTable::new()),
            listeners: ListenerSet::new(),
            host,
            config,
            load_counter: AtomicUsize::new(0),
        }
    }

    /// 내장 플러그인을 등록한 레지스트리
    pub fn with_builtins(host: Arc<dyn PluginHost>, config: RegistryConfig) -> Result<Self> {
        let registry = Self::with_config(host, config);
        registry.register_builtins(&[])?;
        Ok(registry)
    }

    /// 내장 플러그인 등록 (`disabled`에 있는 ID는 건너뜀). 등록된 수를 반환
    pub fn register_builtins(&self, disabled: &[String]) -> Result<usize> {
        let mut count = 0;
        for plugin in builtin::builtin_plugins()? {
            let id = plugin.metadata().id.clone();
            if disabled.contains(&id) {
                debug!(plugin_id = %id, "Skipping disabled builtin plugin");
                continue;
            }
            self.register(plugin)?;
            count += 1;
        }
        Ok(count)
    }

    // ========================================================================
    // 등록 / 해제
    // ========================================================================

    /// 플러그인 등록
    ///
    /// 메타데이터가 잘못되면 `InvalidShape`, 같은 ID가 있으면 `AlreadyRegistered`.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        validate_metadata(plugin.metadata())?;

        let metadata = plugin.metadata().clone();
        {
            let mut plugins = self.plugins.write();
            if plugins.contains_key(&metadata.id) {
                warn!(plugin_id = %metadata.id, "Plugin is already registered");
                return Err(Error::AlreadyRegistered(metadata.id));
            }

            let context = PluginContext::new(
                metadata.id.clone(),
                PluginStorage::default(),
                &self.commands,
                Arc::clone(&self.host),
            );
            let load_order = self.load_counter.fetch_add(1, Ordering::SeqCst);

            plugins.insert(
                metadata.id.clone(),
                PluginState {
                    plugin,
                    status: PluginStatus::Inactive,
                    context,
                    registered_at: Utc::now(),
                    load_order,
                },
            );
        }

        self.notify_listeners();
        info!(plugin_id = %metadata.id, "Registered plugin: {} v{}", metadata.name, metadata.version);
        Ok(())
    }

    /// 플러그인 등록 해제
    ///
    /// 활성 상태면 먼저 비활성화하며, 그 실패는 그대로 전파된다.
    /// 알 수 없는 ID는 조용히 무시한다.
    pub async fn unregister(&self, id: &str) -> Result<()> {
        let status = match self.status(id) {
            Some(status) => status,
            None => {
                debug!(plugin_id = %id, "Unregister requested for unknown plugin");
                return Ok(());
            }
        };

        if status.is_transitioning() {
            return Err(Error::Busy(format!("{} is {}", id, status)));
        }
        if status.is_live() {
            self.deactivate(id).await?;
        }

        {
            // 비활성화 이후 다른 작업이 다시 전이를 시작했을 수 있다
            let mut plugins = self.plugins.write();
            match plugins.get(id).map(|state| state.status) {
                None => return Ok(()),
                Some(PluginStatus::Inactive) => {}
                Some(status) => return Err(Error::Busy(format!("{} is {}", id, status))),
            }
            plugins.remove(id);

            // 비활성 상태에서 컨텍스트로 등록한 커맨드도 함께 정리
            self.commands.remove_owned_by(id);
        }

        self.notify_listeners();
        info!(plugin_id = %id, "Unregistered plugin");
        Ok(())
    }

    // ========================================================================
    // 활성화 / 비활성화
    // ========================================================================

    /// 플러그인 활성화
    ///
    /// 이미 활성 상태면 경고만 남기고 성공한다. 훅이 실패하면 Inactive로 남고
    /// 에러가 호출자에게 전달된다.
    pub async fn activate(&self, id: &str) -> Result<()> {
        let (plugin, context) = {
            let mut plugins = self.plugins.write();
            let state = plugins
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;

            match state.status {
                PluginStatus::Inactive => {}
                status if status.is_live() => {
                    warn!(plugin_id = %id, %status, "Plugin already active");
                    return Ok(());
                }
                status => return Err(Error::Busy(format!("{} is {}", id, status))),
            }

            state.status = PluginStatus::Activating;
            (Arc::clone(&state.plugin), state.context.clone())
        };

        let owned_before = self.commands.ids_owned_by(id);
        let outcome = self
            .run_hook(id, Hook::Activate, plugin.on_activate(&context))
            .await;

        if let Err(e) = outcome {
            // 훅이 실패 전에 새로 등록한 커맨드만 되돌린다
            let reverted = self.commands.remove_owned_by_except(id, &owned_before);
            debug!(plugin_id = %id, commands = ?reverted, "Reverted commands from failed activation");
            self.set_status(id, PluginStatus::Inactive);
            error!(plugin_id = %id, error = %e, "Failed to activate plugin");
            return Err(e);
        }

        {
            let mut plugins = self.plugins.write();
            let still_activating = matches!(
                plugins.get(id),
                Some(state) if state.status == PluginStatus::Activating
            );
            if !still_activating {
                drop(plugins);
                // 훅 실행 중 해제된 플러그인의 커맨드는 남기지 않는다
                self.commands.remove_owned_by(id);
                warn!(plugin_id = %id, "Plugin removed during activation");
                return Err(Error::NotFound(id.to_string()));
            }

            if let Some(contributes) = plugin.contributes() {
                let owner = CommandOwner::plugin(id);
                for command in &contributes.commands {
                    // 훅이 같은 ID로 직접 등록한 핸들러가 선언보다 우선한다
                    if self.commands.owner(&command.id).as_ref() == Some(&owner) {
                        continue;
                    }
                    self.commands.set(command.clone(), owner.clone());
                }
            }

            if let Some(state) = plugins.get_mut(id) {
                state.status = PluginStatus::Active;
            }
        }

        self.notify_listeners();
        info!(plugin_id = %id, "Activated plugin: {}", plugin.metadata().name);
        Ok(())
    }

    /// 플러그인 비활성화
    ///
    /// 이미 비활성 상태면 경고만 남기고 성공한다. 훅이 실패하면
    /// `DeactivationFailed`로 전이하고 기여 항목은 유지된다.
    pub async fn deactivate(&self, id: &str) -> Result<()> {
        let plugin = {
            let mut plugins = self.plugins.write();
            let state = plugins
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;

            match state.status {
                PluginStatus::Inactive => {
                    warn!(plugin_id = %id, "Plugin not active");
                    return Ok(());
                }
                status if status.is_live() => {}
                status => return Err(Error::Busy(format!("{} is {}", id, status))),
            }

            state.status = PluginStatus::Deactivating;
            Arc::clone(&state.plugin)
        };

        let outcome = self
            .run_hook(id, Hook::Deactivate, plugin.on_deactivate())
            .await;

        if let Err(e) = outcome {
            self.set_status(id, PluginStatus::DeactivationFailed);
            error!(plugin_id = %id, error = %e, "Failed to deactivate plugin");
            return Err(e);
        }

        let removed = self.commands.remove_owned_by(id);
        debug!(plugin_id = %id, commands = ?removed, "Removed plugin commands");

        self.set_status(id, PluginStatus::Inactive);
        self.notify_listeners();
        info!(plugin_id = %id, "Deactivated plugin: {}", plugin.metadata().name);
        Ok(())
    }

    /// 훅 실행: 타임아웃, 패닉, 에러를 `HookFailure`/`Timeout`으로 정규화
    async fn run_hook<F>(&self, id: &str, hook: Hook, fut: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        let guarded = AssertUnwindSafe(fut).catch_unwind();

        let outcome = match self.config.hook_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "{} {} did not complete within {:?}",
                        id,
                        hook.as_str(),
                        limit
                    )))
                }
            },
            None => guarded.await,
        };

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e @ Error::HookFailure { .. })) => Err(e),
            Ok(Err(e)) => Err(Error::hook_failure(id, hook.as_str(), e.to_string())),
            Err(_) => Err(Error::hook_failure(id, hook.as_str(), "hook panicked")),
        }
    }

    fn set_status(&self, id: &str, status: PluginStatus) {
        if let Some(state) = self.plugins.write().get_mut(id) {
            state.status = status;
            debug!(plugin_id = %id, %status, "Plugin status changed");
        }
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 등록된 모든 플러그인 메타데이터 (등록 순서)
    pub fn plugins(&self) -> Vec<PluginMetadata> {
        self.collect_metadata(|_| true)
    }

    /// 활성 플러그인 메타데이터 (등록 순서)
    pub fn active_plugins(&self) -> Vec<PluginMetadata> {
        self.collect_metadata(|state| state.status.is_live())
    }

    fn collect_metadata(&self, filter: impl Fn(&PluginState) -> bool) -> Vec<PluginMetadata> {
        let plugins = self.plugins.read();
        let mut selected: Vec<&PluginState> = plugins.values().filter(|s| filter(s)).collect();
        selected.sort_by_key(|state| state.load_order);
        selected
            .into_iter()
            .map(|state| state.plugin.metadata().clone())
            .collect()
    }

    /// 활성 여부 (알 수 없는 ID는 false)
    pub fn is_active(&self, id: &str) -> bool {
        self.status(id).map(|s| s.is_live()).unwrap_or(false)
    }

    /// 플러그인 상태 조회
    pub fn status(&self, id: &str) -> Option<PluginStatus> {
        self.plugins.read().get(id).map(|state| state.status)
    }

    /// 플러그인 정보 스냅샷
    pub fn plugin_info(&self, id: &str) -> Option<PluginInfo> {
        let plugins = self.plugins.read();
        let state = plugins.get(id)?;
        Some(PluginInfo {
            metadata: state.plugin.metadata().clone(),
            status: state.status,
            registered_at: state.registered_at,
            commands: self.commands.ids_owned_by(id),
            contributes: state
                .plugin
                .contributes()
                .map(|c| c.descriptors())
                .unwrap_or_default(),
        })
    }

    /// 플러그인 존재 여부 확인
    pub fn contains(&self, id: &str) -> bool {
        self.plugins.read().contains_key(id)
    }

    /// 플러그인 수
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    // ========================================================================
    // 커맨드
    // ========================================================================

    /// 커맨드 실행 (소유 플러그인과 무관)
    pub async fn execute_command(&self, command_id: &str) -> Result<()> {
        self.commands.execute(command_id).await
    }

    /// 현재 커맨드 테이블 목록
    pub fn commands(&self) -> Vec<CommandDescriptor> {
        self.commands.descriptors()
    }

    /// 커맨드 존재 여부
    pub fn has_command(&self, command_id: &str) -> bool {
        self.commands.contains(command_id)
    }

    // ========================================================================
    // 구독
    // ========================================================================

    /// 변경 구독. 성공한 상태 변경마다 전체 메타데이터 목록으로 호출된다
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[PluginMetadata]) + Send + Sync + 'static,
    {
        self.listeners.subscribe(Arc::new(listener))
    }

    /// 현재 구독자 수
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify_listeners(&self) {
        let plugins = self.plugins();
        self.listeners.notify(&plugins);
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::builder::{create_plugin, PluginBuilder, PluginHandlers};
    use crate::plugin::contribution::{Command, PluginContributions};
    use crate::plugin::context::PluginContext;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    fn metadata(id: &str) -> PluginMetadata {
        PluginMetadata::new(id, format!("{} plugin", id), "1.0.0")
    }

    fn simple_plugin(id: &str) -> Arc<dyn Plugin> {
        Arc::new(create_plugin(
            metadata(id),
            PluginHandlers::new(|_ctx| async { Ok(()) }),
            None,
        ))
    }

    fn plugin_with_command(id: &str, command_id: &str) -> Arc<dyn Plugin> {
        let contributions = PluginContributions::new().with(Command::noop(command_id, "Run"));
        Arc::new(create_plugin(
            metadata(id),
            PluginHandlers::new(|_ctx| async { Ok(()) }),
            Some(contributions),
        ))
    }

    #[tokio::test]
    async fn test_register_plugin() {
        let registry = PluginRegistry::new();
        registry.register(simple_plugin("test.plugin")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.status("test.plugin"), Some(PluginStatus::Inactive));
        assert!(!registry.is_active("test.plugin"));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let registry = PluginRegistry::new();
        registry.register(simple_plugin("test.plugin")).unwrap();

        let err = registry.register(simple_plugin("test.plugin")).unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered(id) if id == "test.plugin"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_plugins_in_registration_order() {
        let registry = PluginRegistry::new();
        for id in ["c", "a", "b"] {
            registry.register(simple_plugin(id)).unwrap();
        }

        let ids: Vec<_> = registry.plugins().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_activate_and_deactivate_commands() {
        let registry = PluginRegistry::new();
        registry.register(plugin_with_command("a", "a.run")).unwrap();

        registry.activate("a").await.unwrap();
        assert!(registry.is_active("a"));
        registry.execute_command("a.run").await.unwrap();
        assert_eq!(registry.active_plugins().len(), 1);

        registry.deactivate("a").await.unwrap();
        assert!(!registry.is_active("a"));
        let err = registry.execute_command("a.run").await.unwrap_err();
        assert!(matches!(err, Error::CommandNotFound(_)));
    }

    #[tokio::test]
    async fn test_activate_is_idempotent() {
        let activations = Arc::new(AtomicUsize::new(0));
        let a = Arc::clone(&activations);
        let plugin = PluginBuilder::new(metadata("a"))
            .on_activate(move |_ctx| {
                let a = Arc::clone(&a);
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .contribute(Command::noop("a.run", "Run"))
            .build()
            .unwrap();

        let registry = PluginRegistry::new();
        registry.register(Arc::new(plugin)).unwrap();

        registry.activate("a").await.unwrap();
        registry.activate("a").await.unwrap();

        assert_eq!(activations.load(Ordering::SeqCst), 1);
        assert_eq!(registry.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_inactive_is_noop() {
        let registry = PluginRegistry::new();
        registry.register(simple_plugin("a")).unwrap();
        registry.deactivate("a").await.unwrap();
        assert_eq!(registry.status("a"), Some(PluginStatus::Inactive));
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let registry = PluginRegistry::new();

        assert!(matches!(registry.activate("nope").await, Err(Error::NotFound(_))));
        assert!(matches!(registry.deactivate("nope").await, Err(Error::NotFound(_))));
        registry.unregister("nope").await.unwrap();
        assert!(!registry.is_active("nope"));
        assert!(registry.status("nope").is_none());
    }

    #[tokio::test]
    async fn test_activation_failure_keeps_inactive() {
        let plugin = PluginBuilder::new(metadata("a"))
            .on_activate(|ctx| async move {
                ctx.register_command(Command::noop("a.partial", "Partial"))?;
                Err::<(), _>(Error::Internal("boom".into()))
            })
            .build()
            .unwrap();

        let registry = PluginRegistry::new();
        registry.register(Arc::new(plugin)).unwrap();

        let err = registry.activate("a").await.unwrap_err();
        assert!(matches!(err, Error::HookFailure { ref hook, .. } if hook == "on_activate"));
        assert_eq!(registry.status("a"), Some(PluginStatus::Inactive));
        assert!(registry.contains("a"));
        assert!(!registry.has_command("a.partial"));
    }

    #[tokio::test]
    async fn test_activation_panic_is_contained() {
        let plugin = PluginBuilder::new(metadata("a"))
            .on_activate(|ctx| async move {
                if ctx.plugin_id() == "a" {
                    panic!("hook exploded");
                }
                Ok(())
            })
            .build()
            .unwrap();

        let registry = PluginRegistry::new();
        registry.register(Arc::new(plugin)).unwrap();

        let err = registry.activate("a").await.unwrap_err();
        assert!(matches!(err, Error::HookFailure { .. }));
        assert_eq!(registry.status("a"), Some(PluginStatus::Inactive));
    }

    #[tokio::test]
    async fn test_deactivation_failure_state() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let a = Arc::clone(&attempts);
        let plugin = PluginBuilder::new(metadata("a"))
            .on_activate(|_ctx| async { Ok(()) })
            .on_deactivate(move || {
                let a = Arc::clone(&a);
                async move {
                    if a.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(Error::Internal("first stop fails".into()))
                    } else {
                        Ok(())
                    }
                }
            })
            .contribute(Command::noop("a.run", "Run"))
            .build()
            .unwrap();

        let registry = PluginRegistry::new();
        registry.register(Arc::new(plugin)).unwrap();
        registry.activate("a").await.unwrap();

        assert!(registry.deactivate("a").await.is_err());
        assert_eq!(registry.status("a"), Some(PluginStatus::DeactivationFailed));
        assert!(registry.is_active("a"));
        assert!(registry.has_command("a.run"));

        // activate는 no-op, deactivate는 재시도 가능
        registry.activate("a").await.unwrap();
        assert_eq!(registry.status("a"), Some(PluginStatus::DeactivationFailed));
        registry.deactivate("a").await.unwrap();
        assert_eq!(registry.status("a"), Some(PluginStatus::Inactive));
        assert!(!registry.has_command("a.run"));
    }

    #[tokio::test]
    async fn test_deactivate_keeps_other_owner_command() {
        let registry = PluginRegistry::new();
        registry.register(plugin_with_command("a", "shared.run")).unwrap();

        let b = PluginBuilder::new(metadata("b"))
            .on_activate(|ctx| async move {
                ctx.register_command(Command::noop("shared.run", "B's run"))
            })
            .build()
            .unwrap();
        registry.register(Arc::new(b)).unwrap();

        registry.activate("a").await.unwrap();
        registry.activate("b").await.unwrap();
        registry.deactivate("a").await.unwrap();

        assert!(registry.has_command("shared.run"));
        registry.execute_command("shared.run").await.unwrap();
    }

    #[tokio::test]
    async fn test_unregister_active_plugin() {
        let registry = PluginRegistry::new();
        registry.register(plugin_with_command("a", "a.run")).unwrap();
        registry.activate("a").await.unwrap();

        registry.unregister("a").await.unwrap();

        assert!(!registry.contains("a"));
        assert!(!registry.has_command("a.run"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        let registry = PluginRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);

        let subscription = registry.subscribe(move |plugins| {
            s.lock().push(plugins.iter().map(|p| p.id.clone()).collect::<Vec<_>>());
        });

        registry.register(simple_plugin("a")).unwrap();
        registry.activate("a").await.unwrap();
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[0], vec!["a".to_string()]);

        assert_eq!(registry.listener_count(), 1);
        assert!(subscription.unsubscribe());
        assert_eq!(registry.listener_count(), 0);
        registry.deactivate("a").await.unwrap();
        assert_eq!(seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_operations_do_not_notify() {
        let registry = PluginRegistry::new();
        registry.register(simple_plugin("a")).unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _subscription = registry.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let _ = registry.register(simple_plugin("a"));
        let _ = registry.activate("missing").await;
        registry.deactivate("a").await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hook_timeout() {
        let plugin = PluginBuilder::new(metadata("slow"))
            .on_activate(|_ctx| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .build()
            .unwrap();

        let registry = PluginRegistry::with_config(
            Arc::new(ConsoleHost::new()),
            RegistryConfig::default().with_hook_timeout(Duration::from_millis(20)),
        );
        registry.register(Arc::new(plugin)).unwrap();

        let err = registry.activate("slow").await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
        assert_eq!(registry.status("slow"), Some(PluginStatus::Inactive));
    }

    struct GatedPlugin {
        metadata: PluginMetadata,
        gate: Arc<tokio::sync::Notify>,
        started: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl Plugin for GatedPlugin {
        fn metadata(&self) -> &PluginMetadata {
            &self.metadata
        }

        async fn on_activate(&self, _ctx: &PluginContext) -> Result<()> {
            self.started.notify_one();
            self.gate.notified().await;
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_activate_is_busy() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let started = Arc::new(tokio::sync::Notify::new());
        let registry = Arc::new(PluginRegistry::new());
        registry
            .register(Arc::new(GatedPlugin {
                metadata: metadata("gated"),
                gate: Arc::clone(&gate),
                started: Arc::clone(&started),
            }))
            .unwrap();

        let r = Arc::clone(&registry);
        let first = tokio::spawn(async move { r.activate("gated").await });
        started.notified().await;

        assert_eq!(registry.status("gated"), Some(PluginStatus::Activating));
        let err = registry.activate("gated").await.unwrap_err();
        assert!(matches!(err, Error::Busy(_)));
        assert!(matches!(registry.unregister("gated").await, Err(Error::Busy(_))));

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(registry.is_active("gated"));
    }

    /// 두 번째 활성화부터 게이트에서 멈추는 플러그인
    struct RelaunchPlugin {
        metadata: PluginMetadata,
        contributions: PluginContributions,
        calls: AtomicUsize,
        started: Mutex<std::sync::mpsc::SyncSender<()>>,
        gate: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl Plugin for RelaunchPlugin {
        fn metadata(&self) -> &PluginMetadata {
            &self.metadata
        }

        fn contributes(&self) -> Option<&PluginContributions> {
            Some(&self.contributions)
        }

        async fn on_activate(&self, _ctx: &PluginContext) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                let _ = self.started.lock().send(());
                self.gate.notified().await;
            }
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unregister_rejects_activation_started_after_deactivate() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let (started_tx, started_rx) = std::sync::mpsc::sync_channel(1);
        let registry = Arc::new(PluginRegistry::new());
        registry
            .register(Arc::new(RelaunchPlugin {
                metadata: metadata("a"),
                contributions: PluginContributions::new().with(Command::noop("a.run", "Run")),
                calls: AtomicUsize::new(0),
                started: Mutex::new(started_tx),
                gate: Arc::clone(&gate),
            }))
            .unwrap();
        registry.activate("a").await.unwrap();

        // unregister 안의 비활성화 알림 시점에 다른 작업이 다시 활성화를 시작한다
        let armed = Arc::new(AtomicBool::new(true));
        let relaunch: Arc<Mutex<Option<tokio::task::JoinHandle<Result<()>>>>> =
            Arc::new(Mutex::new(None));
        let started_rx = Mutex::new(started_rx);
        let weak = Arc::downgrade(&registry);
        let (armed_in, relaunch_in) = (Arc::clone(&armed), Arc::clone(&relaunch));
        let _subscription = registry.subscribe(move |_| {
            if !armed_in.swap(false, Ordering::SeqCst) {
                return;
            }
            let registry = match weak.upgrade() {
                Some(registry) => registry,
                None => return,
            };
            *relaunch_in.lock() = Some(tokio::spawn(async move { registry.activate("a").await }));
            let _ = started_rx.lock().recv();
        });

        let err = registry.unregister("a").await.unwrap_err();
        assert!(matches!(err, Error::Busy(_)));
        assert!(!armed.load(Ordering::SeqCst));

        gate.notify_one();
        let handle = relaunch.lock().take().unwrap();
        handle.await.unwrap().unwrap();

        assert!(registry.contains("a"));
        assert!(registry.is_active("a"));
        assert!(registry.has_command("a.run"));
    }

    #[tokio::test]
    async fn test_failed_activation_keeps_earlier_commands() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let stash: Arc<Mutex<Option<PluginContext>>> = Arc::new(Mutex::new(None));
        let (a, s) = (Arc::clone(&attempts), Arc::clone(&stash));
        let plugin = PluginBuilder::new(metadata("a"))
            .on_activate(move |ctx| {
                let a = Arc::clone(&a);
                let s = Arc::clone(&s);
                async move {
                    if a.fetch_add(1, Ordering::SeqCst) == 0 {
                        *s.lock() = Some(ctx);
                        return Ok(());
                    }
                    ctx.register_command(Command::noop("a.partial", "Partial"))?;
                    Err::<(), _>(Error::Internal("boom".into()))
                }
            })
            .build()
            .unwrap();

        let registry = PluginRegistry::new();
        registry.register(Arc::new(plugin)).unwrap();
        registry.activate("a").await.unwrap();
        registry.deactivate("a").await.unwrap();

        // 비활성 상태에서 보관한 컨텍스트로 등록
        let ctx = stash.lock().take().unwrap();
        ctx.register_command(Command::noop("a.adhoc", "Ad hoc")).unwrap();

        assert!(registry.activate("a").await.is_err());
        assert!(registry.has_command("a.adhoc"));
        assert!(!registry.has_command("a.partial"));
    }

    #[tokio::test]
    async fn test_hook_registered_handler_wins_over_declared() {
        let runs = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&runs);
        let plugin = PluginBuilder::new(metadata("a"))
            .on_activate(move |ctx| {
                let r = Arc::clone(&r);
                async move {
                    ctx.register_command(Command::new("a.run", "Run", move || {
                        let r = Arc::clone(&r);
                        async move {
                            r.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        }
                    }))
                }
            })
            .contribute(Command::noop("a.run", "Run"))
            .build()
            .unwrap();

        let registry = PluginRegistry::new();
        registry.register(Arc::new(plugin)).unwrap();
        registry.activate("a").await.unwrap();

        registry.execute_command("a.run").await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let info = registry.plugin_info("a").unwrap();
        assert_eq!(info.commands, vec!["a.run".to_string()]);
        assert_eq!(info.contributes.commands.len(), 1);
    }

    #[tokio::test]
    async fn test_plugin_info() {
        let registry = PluginRegistry::new();
        registry.register(plugin_with_command("a", "a.run")).unwrap();
        registry.activate("a").await.unwrap();

        let info = registry.plugin_info("a").unwrap();
        assert_eq!(info.status, PluginStatus::Active);
        assert_eq!(info.commands, vec!["a.run".to_string()]);
        assert_eq!(info.contributes.commands.len(), 1);
        assert!(registry.plugin_info("missing").is_none());
    }

    #[test]
    fn test_registry_config_from_plugins_config() {
        let mut plugins = PluginsConfig::default();
        assert!(RegistryConfig::from(&plugins).hook_timeout.is_none());

        plugins.hook_timeout_ms = Some(1500);
        assert_eq!(
            RegistryConfig::from(&plugins).hook_timeout,
            Some(Duration::from_millis(1500))
        );
    }
}
