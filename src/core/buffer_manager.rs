use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::buffer::{Buffer, BufferId};
use super::error::HostError;

/// A buffer with the file it is bound to and its unsaved-changes flag.
#[derive(Debug)]
pub struct BufferState {
    pub buffer: Buffer,
    pub file_path: Option<PathBuf>,
    pub dirty: bool,
}

impl BufferState {
    fn new(buffer: Buffer, file_path: Option<PathBuf>) -> Self {
        Self {
            buffer,
            file_path,
            dirty: false,
        }
    }

    /// Write to the bound file. A `path` rebinds the buffer first, the way
    /// `:w name` names an unnamed buffer. Returns the lines written.
    pub fn save(&mut self, path: Option<&Path>) -> Result<usize, HostError> {
        if let Some(path) = path {
            self.file_path = Some(path.to_path_buf());
        }
        let path = self.file_path.as_deref().ok_or(HostError::NoFileName)?;
        self.buffer
            .write_to(path)
            .map_err(|source| HostError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        self.dirty = false;
        Ok(self.buffer.len_lines())
    }

    /// File name for the status line, or `[No Name]`.
    pub fn display_name(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "[No Name]".to_string())
    }
}

/// Every buffer the host has open, keyed by id. Ids are never reused.
#[derive(Debug, Default)]
pub struct BufferManager {
    buffers: HashMap<BufferId, BufferState>,
    next_id: usize,
}

impl BufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, text: &str, file_path: Option<PathBuf>) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        let state = BufferState::new(Buffer::from_text(id, text), file_path);
        self.buffers.insert(id, state);
        id
    }

    pub fn create(&mut self) -> BufferId {
        self.insert("", None)
    }

    pub fn create_with_text(&mut self, text: &str) -> BufferId {
        self.insert(text, None)
    }

    /// The buffer bound to `path`, loading it if needed. A missing file gives
    /// an empty buffer that will create the file on save.
    pub fn open_file(&mut self, path: &Path) -> Result<BufferId, HostError> {
        if let Some(id) = self.find_by_path(path) {
            return Ok(id);
        }
        let id = self.insert("", Some(path.to_path_buf()));
        if path.exists() {
            let loaded = Buffer::load(id, path).map_err(|source| HostError::Read {
                path: path.to_path_buf(),
                source,
            });
            match loaded {
                Ok(buffer) => {
                    if let Some(state) = self.buffers.get_mut(&id) {
                        state.buffer = buffer;
                    }
                }
                Err(e) => {
                    self.buffers.remove(&id);
                    return Err(e);
                }
            }
        }
        debug!(path = %path.display(), ?id, "opened buffer");
        Ok(id)
    }

    fn find_by_path(&self, path: &Path) -> Option<BufferId> {
        let wanted = canonical(path);
        self.buffers
            .iter()
            .find(|(_, state)| state.file_path.as_deref().map(canonical) == Some(wanted.clone()))
            .map(|(id, _)| *id)
    }

    pub fn get(&self, id: BufferId) -> Option<&BufferState> {
        self.buffers.get(&id)
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut BufferState> {
        self.buffers.get_mut(&id)
    }

    /// Drop a buffer. A dirty one is kept unless `force`.
    pub fn delete(&mut self, id: BufferId, force: bool) -> Result<(), HostError> {
        if !force && self.buffers.get(&id).is_some_and(|state| state.dirty) {
            return Err(HostError::Unsaved);
        }
        self.buffers.remove(&id);
        Ok(())
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_allocates_fresh_ids() {
        let mut manager = BufferManager::new();
        let id1 = manager.create();
        let id2 = manager.create_with_text("hello");

        assert_ne!(id1, id2);
        assert_eq!(manager.get(id2).unwrap().buffer.to_string(), "hello");
        assert_eq!(manager.get(id1).unwrap().buffer.to_string(), "");
    }

    #[test]
    fn test_delete_dirty_blocked() {
        let mut manager = BufferManager::new();
        let id = manager.create();
        manager.get_mut(id).unwrap().dirty = true;

        assert!(matches!(manager.delete(id, false), Err(HostError::Unsaved)));
        assert!(manager.get(id).is_some());
        assert!(manager.delete(id, true).is_ok());
        assert!(manager.get(id).is_none());
    }

    #[test]
    fn test_save_without_name_fails() {
        let mut manager = BufferManager::new();
        let id = manager.create();
        let state = manager.get_mut(id).unwrap();
        assert!(matches!(state.save(None), Err(HostError::NoFileName)));
        assert_eq!(state.display_name(), "[No Name]");
    }

    #[test]
    fn test_open_and_save_roundtrip() {
        let dir = std::env::temp_dir().join(format!("vimchord-bm-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("note.txt");
        std::fs::write(&path, "one\ntwo\n").unwrap();

        let mut manager = BufferManager::new();
        let id = manager.open_file(&path).unwrap();
        // Opening again reuses the buffer.
        assert_eq!(manager.open_file(&path).unwrap(), id);

        let state = manager.get_mut(id).unwrap();
        assert_eq!(state.display_name(), "note.txt");
        state.buffer.replace(0..0, "zero\n");
        state.dirty = true;
        assert_eq!(state.save(None).unwrap(), 3);
        assert!(!state.dirty);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "zero\none\ntwo\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_missing_file_is_empty_and_named() {
        let path = std::env::temp_dir().join(format!("vimchord-missing-{}.txt", std::process::id()));
        let mut manager = BufferManager::new();
        let id = manager.open_file(&path).unwrap();
        let state = manager.get(id).unwrap();
        assert_eq!(state.buffer.to_string(), "");
        assert_eq!(state.file_path.as_deref(), Some(path.as_path()));
    }
}
