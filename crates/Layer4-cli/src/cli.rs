//! Non-interactive CLI commands

use crate::registry::default_registry;
use anyhow::Context;
use codystack_core::plugin::{metadata_from_value, validate_plugin_value};
use codystack_core::{PluginCategory, PluginManifest, PluginMetadata, PluginRegistry, PluginStatus};
use std::path::Path;

fn registry() -> anyhow::Result<&'static PluginRegistry> {
    default_registry().context("plugin registry is not initialized")
}

/// 플러그인 목록
pub fn list_plugins(active_only: bool) -> anyhow::Result<()> {
    let registry = registry()?;
    let plugins = if active_only {
        registry.active_plugins()
    } else {
        registry.plugins()
    };

    if plugins.is_empty() {
        println!("No plugins found.");
        return Ok(());
    }

    println!("\n🧩 Plugins\n");
    println!(
        "{:<24} {:<24} {:<10} {:<14} {:<20}",
        "ID", "Name", "Version", "Category", "Status"
    );
    println!("{}", "-".repeat(92));

    for plugin in plugins {
        let status = registry
            .status(&plugin.id)
            .unwrap_or(PluginStatus::Inactive);
        println!(
            "{:<24} {:<24} {:<10} {:<14} {:<20}",
            truncate(&plugin.id, 22),
            truncate(&plugin.name, 22),
            plugin.version,
            plugin.category.as_str(),
            status
        );
    }

    println!("\nUse 'codystack activate <ID>' to activate a plugin.\n");
    Ok(())
}

/// 카테고리 카탈로그
pub fn list_categories() {
    println!("\n📚 Plugin Categories\n");
    for category in PluginCategory::ALL {
        println!(
            "{} {:<14} {:<16} {}",
            category.icon(),
            category.as_str(),
            category.label(),
            category.description()
        );
    }
    println!();
}

/// 플러그인 활성화 후 커맨드 출력
pub async fn activate(id: &str) -> anyhow::Result<()> {
    let registry = registry()?;
    registry
        .activate(id)
        .await
        .with_context(|| format!("failed to activate plugin '{}'", id))?;

    println!("✓ {} is {}", id, registry.status(id).unwrap_or(PluginStatus::Inactive));

    let commands = registry
        .plugin_info(id)
        .map(|info| info.commands)
        .unwrap_or_default();
    if commands.is_empty() {
        println!("  (no commands)");
    }
    for descriptor in registry.commands() {
        if commands.contains(&descriptor.id) {
            println!("  {:<32} {}", descriptor.id, descriptor.title);
        }
    }
    Ok(())
}

/// 플러그인 활성화 후 커맨드 실행
pub async fn run_command(plugin_id: &str, command_id: &str) -> anyhow::Result<()> {
    let registry = registry()?;
    registry
        .activate(plugin_id)
        .await
        .with_context(|| format!("failed to activate plugin '{}'", plugin_id))?;

    registry
        .execute_command(command_id)
        .await
        .with_context(|| format!("command '{}' failed", command_id))?;

    println!("✓ Executed {}", command_id);
    Ok(())
}

/// 매니페스트 파일 검증
pub fn inspect_manifest(path: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let metadata =
        parse_metadata(&json).with_context(|| format!("invalid manifest {}", path.display()))?;

    println!("✓ Valid manifest: {} v{}", metadata.name, metadata.version);
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

/// `{ "metadata": {...} }` 플러그인 기술자 또는 npm 스타일 package.json
fn parse_metadata(json: &str) -> anyhow::Result<PluginMetadata> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if validate_plugin_value(&value) {
        return Ok(metadata_from_value(&value)?);
    }
    Ok(PluginManifest::from_json(json)?.to_metadata())
}

/// 표시용 문자열 자르기
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
