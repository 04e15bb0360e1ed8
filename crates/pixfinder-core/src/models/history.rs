use serde::{Deserialize, Serialize};

pub const HISTORY_CAPACITY: usize = 5;

/// Most-recent-first list of distinct search terms, capped at
/// [`HISTORY_CAPACITY`] entries.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct HistoryList {
    entries: Vec<String>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.iter().any(|entry| entry == query)
    }

    /// Moves `query` to the front, dropping any earlier occurrence and
    /// anything past capacity.
    pub fn record(&mut self, query: &str) {
        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_owned());
        self.entries.truncate(HISTORY_CAPACITY);
    }
}

impl From<Vec<String>> for HistoryList {
    fn from(raw: Vec<String>) -> Self {
        let mut entries: Vec<String> = Vec::with_capacity(HISTORY_CAPACITY);
        for entry in raw {
            if entries.len() == HISTORY_CAPACITY {
                break;
            }
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Self { entries }
    }
}

impl From<HistoryList> for Vec<String> {
    fn from(list: HistoryList) -> Self {
        list.entries
    }
}
