//! CodyStack init command
//!
//! Initializes a project with a .codystack/config.json file.

use codystack_core::plugin::builtin::ARCHITECT_AGENT_ID;
use codystack_foundation::{CodyConfig, JsonStore, CODYSTACK_CONFIG_FILE};
use std::path::Path;

/// Initialize CodyStack configuration in the current directory
pub fn init_project(force: bool) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    init_project_in(&cwd, force)?;
    Ok(())
}

/// Initialize CodyStack configuration under `root`. Returns true when a file was written
pub fn init_project_in(root: &Path, force: bool) -> anyhow::Result<bool> {
    let store = JsonStore::project(root);

    if store.exists(CODYSTACK_CONFIG_FILE) && !force {
        println!("✓ CodyStack already initialized in this directory.");
        println!("  Use --force to reinitialize.");
        return Ok(false);
    }

    println!("Initializing CodyStack...");

    let config = CodyConfig::new()
        .log_level("info")
        .auto_activate(ARCHITECT_AGENT_ID);
    config.save_to(&store)?;

    println!("  Created {}", store.file_path(CODYSTACK_CONFIG_FILE).display());
    println!("\n✓ CodyStack initialized!");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_project_in() {
        let dir = tempfile::tempdir().unwrap();

        assert!(init_project_in(dir.path(), false).unwrap());
        assert!(!init_project_in(dir.path(), false).unwrap());
        assert!(init_project_in(dir.path(), true).unwrap());

        let config = CodyConfig::load_from(&JsonStore::project(dir.path())).unwrap();
        assert_eq!(config.plugins.auto_activate, vec![ARCHITECT_AGENT_ID.to_string()]);
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }
}
