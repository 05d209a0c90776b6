//! # codystack-foundation
//!
//! Foundation layer for CodyStack:
//! - Error: 중앙 에러 타입
//! - Config: 통합 설정 (CodyConfig, PluginsConfig)
//! - Storage: JsonStore (글로벌/프로젝트 설정 파일)

pub mod config;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{CodyConfig, PluginsConfig, CODYSTACK_CONFIG_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
