//! Plugin Events - 플러그인 목록 변경 구독
//!
//! 상태를 바꾸는 작업이 성공할 때마다 전체 메타데이터 목록으로 리스너를 호출한다.
//! 호출은 같은 작업 안에서 동기적으로, 등록 순서대로 이루어진다.

use super::manifest::PluginMetadata;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// 리스너 콜백
pub type PluginListener = Arc<dyn Fn(&[PluginMetadata]) + Send + Sync>;

/// 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

#[derive(Default)]
struct ListenerSlots {
    listeners: RwLock<Vec<(ListenerId, PluginListener)>>,
    counter: AtomicU64,
}

/// 리스너 집합 (레지스트리 소유)
#[derive(Default)]
pub(crate) struct ListenerSet {
    slots: Arc<ListenerSlots>,
}

impl ListenerSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 리스너 추가
    pub(crate) fn subscribe(&self, listener: PluginListener) -> Subscription {
        let id = ListenerId(self.slots.counter.fetch_add(1, Ordering::SeqCst));
        self.slots.listeners.write().push((id, listener));
        debug!(listener_id = %id, "Registered plugin listener");

        Subscription {
            id,
            slots: Arc::downgrade(&self.slots),
        }
    }

    /// 등록 순서대로 호출
    ///
    /// 잠금을 풀고 호출하므로 리스너 안에서 구독/해제를 해도 된다.
    pub(crate) fn notify(&self, plugins: &[PluginMetadata]) {
        let listeners: Vec<PluginListener> = self
            .slots
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        trace!(listeners = listeners.len(), plugins = plugins.len(), "Notifying plugin listeners");
        for listener in listeners {
            listener(plugins);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.listeners.read().len()
    }
}

/// 구독 핸들
///
/// `unsubscribe`를 호출해야 해제된다. 핸들을 버리는 것만으로는 해제되지 않는다.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    slots: Weak<ListenerSlots>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// 구독 해제. 실제로 제거되었으면 true
    pub fn unsubscribe(self) -> bool {
        let Some(slots) = self.slots.upgrade() else {
            return false;
        };
        let mut listeners = slots.listeners.write();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        let removed = listeners.len() != before;

        if removed {
            debug!(listener_id = %self.id, "Unregistered plugin listener");
        }
        removed
    }
}
