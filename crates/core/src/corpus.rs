use std::path::Path;

use tracing::info;

use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Seed inputs loaded once per run. Entries are never mutated in place; callers copy
/// an entry before mutating it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Reads every regular file in `dir`, ordered by file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut entries = vec![];
        for dir_entry in std::fs::read_dir(dir.as_ref())? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            entries.push(CorpusEntry {
                name: dir_entry.file_name().to_string_lossy().into_owned(),
                data: std::fs::read(dir_entry.path())?,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        info!(
            "loaded {} corpus elements from {}",
            entries.len(),
            dir.as_ref().display()
        );
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
