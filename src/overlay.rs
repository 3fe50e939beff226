use std::collections::BTreeMap;

use tracing::debug;

use vitrine_api_structs::PhotoRecord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        match name {
            "Escape" | "Esc" | "escape" | "esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Document-level key listeners bound by the overlays.
#[derive(Debug, Default)]
pub struct KeyListeners {
    next_id: u64,
    bound: BTreeMap<ListenerId, Key>,
}

impl KeyListeners {
    fn bind(&mut self, key: Key) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.bound.insert(id, key);
        id
    }

    fn unbind(&mut self, id: ListenerId) {
        self.bound.remove(&id);
    }

    fn is_bound(&self, id: ListenerId) -> bool {
        self.bound.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

#[derive(Debug)]
struct Fullscreen {
    escape: ListenerId,
}

/// The lightbox and the fullscreen layer above it. At most one of each is open.
#[derive(Debug, Default)]
pub struct Overlay {
    current: Option<PhotoRecord>,
    fullscreen: Option<Fullscreen>,
    listeners: KeyListeners,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_photo(&self) -> Option<&PhotoRecord> {
        self.current.as_ref()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_some()
    }

    /// Background scrolling is disabled while the modal is up.
    pub fn scroll_locked(&self) -> bool {
        self.current.is_some()
    }

    pub fn key_listeners(&self) -> &KeyListeners {
        &self.listeners
    }

    pub fn open_modal(&mut self, photo: PhotoRecord) {
        self.close_modal();
        debug!(photo = %photo.id, "modal opened");
        self.current = Some(photo);
    }

    pub fn close_modal(&mut self) {
        self.close_fullscreen();
        if let Some(photo) = self.current.take() {
            debug!(photo = %photo.id, "modal closed");
        }
    }

    pub fn open_fullscreen(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.close_fullscreen();

        let escape = self.listeners.bind(Key::Escape);
        self.fullscreen = Some(Fullscreen { escape });
    }

    pub fn close_fullscreen(&mut self) {
        if let Some(fullscreen) = self.fullscreen.take() {
            self.listeners.unbind(fullscreen.escape);
        }
    }

    /// Escape closes the topmost overlay. Returns whether anything changed.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        if *key != Key::Escape {
            return false;
        }

        let listening = self
            .fullscreen
            .as_ref()
            .map_or(false, |f| self.listeners.is_bound(f.escape));

        if listening {
            self.close_fullscreen();
            true
        } else if self.current.is_some() {
            self.close_modal();
            true
        } else {
            false
        }
    }
}
