//! Built-in Plugins
//!
//! 기본 제공 플러그인들

mod architect;

pub use architect::{architect_agent, ARCHITECT_AGENT_ID};

use super::traits::Plugin;
use codystack_foundation::Result;
use std::sync::Arc;

/// 모든 내장 플러그인
pub fn builtin_plugins() -> Result<Vec<Arc<dyn Plugin>>> {
    Ok(vec![Arc::new(architect_agent()?)])
}
