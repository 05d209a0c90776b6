//! Config - 통합 설정 관리
//!
//! - `codystack.rs` - CodyConfig 통합 설정 (플러그인, 로깅)

mod codystack;

pub use codystack::{CodyConfig, PluginsConfig, CODYSTACK_CONFIG_FILE};
