//! Undo/redo snapshots of the record table.
//!
//! History lives only as long as the process; the record file itself always
//! holds the latest state.

use toml::Table;

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    description: String,
    records: Table,
}

#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Remember the state before a change. Clears the redo stack.
    pub fn record(&mut self, description: impl Into<String>, before: Table) {
        self.undo.push(Snapshot {
            description: description.into(),
            records: before,
        });
        if self.undo.len() > self.limit {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Step back; `current` becomes redoable. Returns the change description
    /// and the state to restore.
    pub fn undo(&mut self, current: Table) -> Option<(String, Table)> {
        let snapshot = self.undo.pop()?;
        self.redo.push(Snapshot {
            description: snapshot.description.clone(),
            records: current,
        });
        Some((snapshot.description, snapshot.records))
    }

    pub fn redo(&mut self, current: Table) -> Option<(String, Table)> {
        let snapshot = self.redo.pop()?;
        self.undo.push(Snapshot {
            description: snapshot.description.clone(),
            records: current,
        });
        Some((snapshot.description, snapshot.records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(label: &str) -> Table {
        let mut table = Table::new();
        table.insert(label.to_string(), toml::Value::Table(Table::new()));
        table
    }

    #[test]
    fn test_undo_then_redo_restores_states() {
        let mut history = History::default();
        history.record("add b", table("a"));

        let (description, restored) = history.undo(table("b")).unwrap();
        assert_eq!(description, "add b");
        assert_eq!(restored, table("a"));
        assert!(history.undo.is_empty());

        let (_, redone) = history.redo(table("a")).unwrap();
        assert_eq!(redone, table("b"));
        assert!(!history.undo.is_empty());
        assert!(history.redo.is_empty());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut history = History::default();
        history.record("first", table("a"));
        history.undo(table("b"));
        assert!(!history.redo.is_empty());

        history.record("second", table("a"));
        assert!(history.redo.is_empty());
        assert!(history.redo(table("a")).is_none());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(2);
        history.record("one", table("1"));
        history.record("two", table("2"));
        history.record("three", table("3"));

        assert_eq!(history.undo(Table::new()).unwrap().0, "three");
        assert_eq!(history.undo(Table::new()).unwrap().0, "two");
        assert!(history.undo(Table::new()).is_none());
    }
}
