//! Plugin Builder - 클로저 기반 플러그인 생성 헬퍼
//!
//! 트레이트를 직접 구현하지 않고 메타데이터 + 훅 + 기여 항목으로 플러그인을 만든다.
//! `on_deactivate`를 생략하면 즉시 완료되는 no-op이 된다.

use super::context::PluginContext;
use super::contribution::PluginContributions;
use super::manifest::PluginMetadata;
use super::traits::{validate_metadata, Plugin};
use async_trait::async_trait;
use codystack_foundation::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

/// 활성화 훅
pub type ActivateHook = Arc<dyn Fn(PluginContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// 비활성화 훅
pub type DeactivateHook = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

fn activate_hook<F, Fut>(f: F) -> ActivateHook
where
    F: Fn(PluginContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx: PluginContext| f(ctx).boxed())
}

fn deactivate_hook<F, Fut>(f: F) -> DeactivateHook
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

// ============================================================================
// PluginHandlers / create_plugin
// ============================================================================

/// 라이프사이클 핸들러 묶음
#[derive(Clone)]
pub struct PluginHandlers {
    pub on_activate: ActivateHook,
    pub on_deactivate: Option<DeactivateHook>,
}

impl PluginHandlers {
    pub fn new<F, Fut>(on_activate: F) -> Self
    where
        F: Fn(PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            on_activate: activate_hook(on_activate),
            on_deactivate: None,
        }
    }

    pub fn with_deactivate<F, Fut>(mut self, on_deactivate: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_deactivate = Some(deactivate_hook(on_deactivate));
        self
    }
}

/// 메타데이터, 핸들러, 기여 항목으로 플러그인 생성
///
/// 메타데이터 검증은 등록 시점에 레지스트리가 한다.
pub fn create_plugin(
    metadata: PluginMetadata,
    handlers: PluginHandlers,
    contributions: Option<PluginContributions>,
) -> FnPlugin {
    FnPlugin {
        metadata,
        contributes: contributions,
        on_activate: handlers.on_activate,
        on_deactivate: handlers
            .on_deactivate
            .unwrap_or_else(|| deactivate_hook(|| async { Ok(()) })),
    }
}

// ============================================================================
// FnPlugin
// ============================================================================

/// 클로저 기반 플러그인
pub struct FnPlugin {
    metadata: PluginMetadata,
    contributes: Option<PluginContributions>,
    on_activate: ActivateHook,
    on_deactivate: DeactivateHook,
}

impl std::fmt::Debug for FnPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPlugin")
            .field("metadata", &self.metadata)
            .field("contributes", &self.contributes)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Plugin for FnPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn contributes(&self) -> Option<&PluginContributions> {
        self.contributes.as_ref()
    }

    async fn on_activate(&self, ctx: &PluginContext) -> Result<()> {
        (self.on_activate)(ctx.clone()).await
    }

    async fn on_deactivate(&self) -> Result<()> {
        (self.on_deactivate)().await
    }
}

// ============================================================================
// PluginBuilder
// ============================================================================

/// 플러그인 빌더
///
/// ```ignore
/// let plugin = PluginBuilder::new(PluginMetadata::new("arch", "Architect", "1.0.0"))
///     .on_activate(|ctx| async move {
///         ctx.register_command(Command::noop("arch.run", "Run"))
///     })
///     .build()?;
/// ```
pub struct PluginBuilder {
    metadata: PluginMetadata,
    contributes: PluginContributions,
    on_activate: Option<ActivateHook>,
    on_deactivate: Option<DeactivateHook>,
}

impl PluginBuilder {
    pub fn new(metadata: PluginMetadata) -> Self {
        Self {
            metadata,
            contributes: PluginContributions::default(),
            on_activate: None,
            on_deactivate: None,
        }
    }

    pub fn on_activate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(PluginContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_activate = Some(activate_hook(f));
        self
    }

    pub fn on_deactivate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_deactivate = Some(deactivate_hook(f));
        self
    }

    /// 기여 묶음 설정 (기존 내용 대체)
    pub fn contributes(mut self, contributions: PluginContributions) -> Self {
        self.contributes = contributions;
        self
    }

    /// 기여 항목 하나 추가
    pub fn contribute(mut self, contribution: impl Into<super::contribution::Contribution>) -> Self {
        self.contributes.push(contribution);
        self
    }

    /// 플러그인 생성. 활성화 훅이 없거나 메타데이터가 잘못되면 `InvalidShape`
    pub fn build(self) -> Result<FnPlugin> {
        validate_metadata(&self.metadata)?;

        let on_activate = self.on_activate.ok_or_else(|| {
            Error::InvalidShape(format!(
                "plugin {} has no on_activate handler",
                self.metadata.id
            ))
        })?;

        let handlers = PluginHandlers {
            on_activate,
            on_deactivate: self.on_deactivate,
        };
        let contributes = (!self.contributes.is_empty()).then_some(self.contributes);

        Ok(create_plugin(self.metadata, handlers, contributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::command::CommandTable;
    use crate::plugin::contribution::Command;
    use crate::plugin::host::ConsoleHost;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn metadata() -> PluginMetadata {
        PluginMetadata::new("test.plugin", "Test Plugin", "1.0.0")
    }

    #[test]
    fn test_build_requires_on_activate() {
        let err = PluginBuilder::new(metadata()).build().unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
    }

    #[test]
    fn test_build_rejects_empty_metadata() {
        let err = PluginBuilder::new(PluginMetadata::new("", "Test", "1.0.0"))
            .on_activate(|_ctx| async { Ok(()) })
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidShape(_)));
    }

    #[tokio::test]
    async fn test_default_on_deactivate_is_noop() {
        let plugin = create_plugin(
            metadata(),
            PluginHandlers::new(|_ctx| async { Ok(()) }),
            None,
        );

        plugin.on_deactivate().await.unwrap();
        assert!(plugin.contributes().is_none());
    }

    #[tokio::test]
    async fn test_hooks_are_invoked() {
        let activations = Arc::new(AtomicUsize::new(0));
        let deactivations = Arc::new(AtomicUsize::new(0));
        let a = Arc::clone(&activations);
        let d = Arc::clone(&deactivations);

        let plugin = PluginBuilder::new(metadata())
            .on_activate(move |ctx| {
                let a = Arc::clone(&a);
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    ctx.set_state("activated", true);
                    Ok(())
                }
            })
            .on_deactivate(move || {
                let d = Arc::clone(&d);
                async move {
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .contribute(Command::noop("test.run", "Run"))
            .build()
            .unwrap();

        let table = Arc::new(CommandTable::new());
        let ctx = PluginContext::new(
            "test.plugin",
            Default::default(),
            &table,
            Arc::new(ConsoleHost::new()),
        );

        plugin.on_activate(&ctx).await.unwrap();
        plugin.on_deactivate().await.unwrap();

        assert_eq!(activations.load(Ordering::SeqCst), 1);
        assert_eq!(deactivations.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.get_state_as::<bool>("activated"), Some(true));
        assert_eq!(plugin.contributes().unwrap().commands.len(), 1);
    }
}
