//! Command Table - 커맨드 ID → 핸들러 공유 테이블
//!
//! 삽입은 항상 덮어쓰기(last writer wins)이고, 항목마다 소유자를 기록한다.
//! 비활성화 시에는 해당 플러그인이 현재 소유한 항목만 제거된다.

use super::contribution::{Command, CommandDescriptor};
use codystack_foundation::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// 커맨드 소유자
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandOwner {
    /// 호스트 애플리케이션이 직접 등록
    Host,
    /// 플러그인이 등록 (플러그인 ID)
    Plugin(String),
}

impl CommandOwner {
    pub fn plugin(id: impl Into<String>) -> Self {
        Self::Plugin(id.into())
    }

    fn is_plugin(&self, plugin_id: &str) -> bool {
        matches!(self, Self::Plugin(id) if id == plugin_id)
    }
}

struct CommandEntry {
    command: Command,
    owner: CommandOwner,
}

/// 커맨드 테이블
#[derive(Default)]
pub struct CommandTable {
    entries: RwLock<HashMap<String, CommandEntry>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 커맨드 삽입 (같은 ID가 있으면 덮어씀). 이전 소유자를 반환
    pub fn set(&self, command: Command, owner: CommandOwner) -> Option<CommandOwner> {
        let id = command.id.clone();
        let mut entries = self.entries.write();
        let previous = entries
            .insert(id.clone(), CommandEntry { command, owner: owner.clone() })
            .map(|entry| entry.owner);

        match &previous {
            Some(prev) if *prev != owner => {
                debug!(command_id = %id, previous = ?prev, owner = ?owner, "Command overwritten by a different owner");
            }
            _ => debug!(command_id = %id, owner = ?owner, "Command registered"),
        }

        previous
    }

    /// 커맨드 조회 (핸들러 포함 복제)
    pub fn get(&self, id: &str) -> Option<Command> {
        self.entries.read().get(id).map(|entry| entry.command.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    /// 현재 소유자 조회
    pub fn owner(&self, id: &str) -> Option<CommandOwner> {
        self.entries.read().get(id).map(|entry| entry.owner.clone())
    }

    /// 커맨드 제거
    pub fn remove(&self, id: &str) -> Option<Command> {
        self.entries.write().remove(id).map(|entry| entry.command)
    }

    /// 플러그인이 현재 소유한 모든 커맨드 제거. 제거된 ID를 반환
    pub fn remove_owned_by(&self, plugin_id: &str) -> Vec<String> {
        let mut entries = self.entries.write();
        let ids: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.owner.is_plugin(plugin_id))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &ids {
            entries.remove(id);
        }

        if !ids.is_empty() {
            debug!(plugin_id, count = ids.len(), "Removed plugin commands");
        }
        ids
    }

    /// `keep`에 없는 항목만 제거하는 `remove_owned_by`
    pub fn remove_owned_by_except(&self, plugin_id: &str, keep: &[String]) -> Vec<String> {
        let mut entries = self.entries.write();
        let ids: Vec<String> = entries
            .iter()
            .filter(|(id, entry)| entry.owner.is_plugin(plugin_id) && !keep.contains(id))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &ids {
            entries.remove(id);
        }
        ids
    }

    /// 플러그인이 현재 소유한 커맨드 ID (정렬됨)
    pub fn ids_owned_by(&self, plugin_id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.owner.is_plugin(plugin_id))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// 전체 커맨드 정보 (ID 순)
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        let mut descriptors: Vec<CommandDescriptor> = self
            .entries
            .read()
            .values()
            .map(|entry| entry.command.descriptor())
            .collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    /// 조회 후 실행. 없으면 `CommandNotFound`
    ///
    /// 핸들러는 테이블 잠금 밖에서 실행되므로 다른 커맨드를 등록하거나 실행해도 된다.
    pub async fn execute(&self, id: &str) -> Result<()> {
        let command = self
            .get(id)
            .ok_or_else(|| Error::CommandNotFound(id.to_string()))?;
        debug!(command_id = %id, "Executing command");
        command.run().await
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let table = CommandTable::new();

        assert!(table.set(Command::noop("x.run", "First"), CommandOwner::plugin("a")).is_none());
        let previous = table.set(Command::noop("x.run", "Second"), CommandOwner::plugin("b"));

        assert_eq!(previous, Some(CommandOwner::plugin("a")));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("x.run").unwrap().title, "Second");
        assert_eq!(table.owner("x.run"), Some(CommandOwner::plugin("b")));
    }

    #[test]
    fn test_remove_owned_by_respects_ownership() {
        let table = CommandTable::new();
        table.set(Command::noop("a.one", "One"), CommandOwner::plugin("a"));
        table.set(Command::noop("a.two", "Two"), CommandOwner::plugin("a"));
        table.set(Command::noop("shared", "Shared"), CommandOwner::plugin("a"));
        // b가 같은 ID를 덮어씀
        table.set(Command::noop("shared", "Shared by b"), CommandOwner::plugin("b"));
        table.set(Command::noop("host.reload", "Reload"), CommandOwner::Host);

        let mut removed = table.remove_owned_by("a");
        removed.sort();

        assert_eq!(removed, vec!["a.one".to_string(), "a.two".to_string()]);
        assert!(table.contains("shared"));
        assert!(table.contains("host.reload"));
        assert_eq!(table.ids_owned_by("b"), vec!["shared".to_string()]);
    }

    #[test]
    fn test_remove_owned_by_except_keeps_listed() {
        let table = CommandTable::new();
        table.set(Command::noop("a.old", "Old"), CommandOwner::plugin("a"));
        table.set(Command::noop("a.new", "New"), CommandOwner::plugin("a"));
        table.set(Command::noop("b.run", "Run"), CommandOwner::plugin("b"));

        let removed = table.remove_owned_by_except("a", &["a.old".to_string()]);

        assert_eq!(removed, vec!["a.new".to_string()]);
        assert_eq!(table.ids_owned_by("a"), vec!["a.old".to_string()]);
        assert!(table.contains("b.run"));
    }

    #[tokio::test]
    async fn test_execute_missing_command() {
        let table = CommandTable::new();
        let err = table.execute("missing").await.unwrap_err();
        assert!(matches!(err, Error::CommandNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_execute_propagates_handler_error() {
        let table = CommandTable::new();
        table.set(
            Command::new("x.fail", "Fail", || async {
                Err(Error::command_failed("x.fail", "boom"))
            }),
            CommandOwner::Host,
        );

        let err = table.execute("x.fail").await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }

    #[test]
    fn test_descriptors_sorted() {
        let table = CommandTable::new();
        table.set(Command::noop("b", "B"), CommandOwner::Host);
        table.set(Command::noop("a", "A"), CommandOwner::Host);

        let ids: Vec<_> = table.descriptors().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
