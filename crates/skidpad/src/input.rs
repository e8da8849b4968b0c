//! Keyboard sampling for the driving keys.
//!
//! Input is level-triggered: only whether a key is currently held matters.
//! Key events may arrive at any point between ticks; the tick reads the
//! latest [`KeyState`] once.

/// One of the four driving directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriveKey {
    Forward,
    Backward,
    Left,
    Right,
}

impl DriveKey {
    /// Map a key name to a driving direction.
    ///
    /// Accepts `w`/`a`/`s`/`d` in either case and the arrow key names
    /// (`ArrowUp`, `ArrowDown`, `ArrowLeft`, `ArrowRight`), matched
    /// case-insensitively.
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "w" | "arrowup" => Some(Self::Forward),
            "s" | "arrowdown" => Some(Self::Backward),
            "a" | "arrowleft" => Some(Self::Left),
            "d" | "arrowright" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Whether the host should suppress the default action for a key
/// (arrow keys scroll the page in a browser).
pub fn suppresses_default(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "arrowup" | "arrowdown" | "arrowleft" | "arrowright"
    )
}

/// Instantaneous state of the driving keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    /// Set the level of one key.
    pub fn set(&mut self, key: DriveKey, pressed: bool) {
        match key {
            DriveKey::Forward => self.forward = pressed,
            DriveKey::Backward => self.backward = pressed,
            DriveKey::Left => self.left = pressed,
            DriveKey::Right => self.right = pressed,
        }
    }

    /// Whether a key is held.
    pub fn is_pressed(&self, key: DriveKey) -> bool {
        match key {
            DriveKey::Forward => self.forward,
            DriveKey::Backward => self.backward,
            DriveKey::Left => self.left,
            DriveKey::Right => self.right,
        }
    }
}

/// Host-facing result of feeding one key event to the sampler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyResponse {
    /// The key mapped to a driving direction.
    pub handled: bool,
    /// The host should cancel the key's default action.
    pub prevent_default: bool,
}

/// Tracks the driving keys from raw key-down/key-up events.
#[derive(Clone, Debug, Default)]
pub struct InputSampler {
    keys: KeyState,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key-down event.
    pub fn key_down(&mut self, key: &str) -> KeyResponse {
        self.handle(key, true)
    }

    /// Handle a key-up event.
    pub fn key_up(&mut self, key: &str) -> KeyResponse {
        self.handle(key, false)
    }

    fn handle(&mut self, key: &str, pressed: bool) -> KeyResponse {
        // Key-up never needs suppression; only key-down scrolls the page.
        let prevent_default = pressed && suppresses_default(key);
        let Some(drive_key) = DriveKey::from_key_name(key) else {
            return KeyResponse {
                handled: false,
                prevent_default,
            };
        };
        self.keys.set(drive_key, pressed);
        tracing::trace!(?drive_key, pressed, "drive key");
        KeyResponse {
            handled: true,
            prevent_default,
        }
    }

    /// Release every key, e.g. when the window loses keyboard focus.
    pub fn release_all(&mut self) {
        self.keys = KeyState::default();
    }

    /// Current key levels.
    pub fn state(&self) -> KeyState {
        self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(DriveKey::from_key_name("w"), Some(DriveKey::Forward));
        assert_eq!(DriveKey::from_key_name("W"), Some(DriveKey::Forward));
        assert_eq!(DriveKey::from_key_name("ArrowUp"), Some(DriveKey::Forward));
        assert_eq!(DriveKey::from_key_name("s"), Some(DriveKey::Backward));
        assert_eq!(DriveKey::from_key_name("ArrowDown"), Some(DriveKey::Backward));
        assert_eq!(DriveKey::from_key_name("a"), Some(DriveKey::Left));
        assert_eq!(DriveKey::from_key_name("ArrowLeft"), Some(DriveKey::Left));
        assert_eq!(DriveKey::from_key_name("d"), Some(DriveKey::Right));
        assert_eq!(DriveKey::from_key_name("ArrowRight"), Some(DriveKey::Right));
        assert_eq!(DriveKey::from_key_name("q"), None);
        assert_eq!(DriveKey::from_key_name(" "), None);
    }

    #[test]
    fn test_level_triggered() {
        let mut sampler = InputSampler::new();
        sampler.key_down("w");
        // Repeated key-down (auto-repeat) keeps the level.
        sampler.key_down("w");
        assert!(sampler.state().forward);

        sampler.key_up("w");
        assert!(!sampler.state().forward);
    }

    #[test]
    fn test_aliases_share_a_flag() {
        let mut sampler = InputSampler::new();
        sampler.key_down("ArrowLeft");
        assert!(sampler.state().left);
        // Releasing the letter alias clears the same flag.
        sampler.key_up("a");
        assert!(!sampler.state().left);
    }

    #[test]
    fn test_opposites_can_be_held_together() {
        let mut sampler = InputSampler::new();
        sampler.key_down("w");
        sampler.key_down("s");
        let state = sampler.state();
        assert!(state.forward && state.backward);
    }

    #[test]
    fn test_arrow_keys_prevent_default() {
        let mut sampler = InputSampler::new();
        let response = sampler.key_down("ArrowDown");
        assert!(response.handled);
        assert!(response.prevent_default);

        let response = sampler.key_down("s");
        assert!(response.handled);
        assert!(!response.prevent_default);

        assert!(!sampler.key_up("ArrowDown").prevent_default);
    }

    #[test]
    fn test_unmapped_key_is_noop() {
        let mut sampler = InputSampler::new();
        let response = sampler.key_down("Enter");
        assert_eq!(response, KeyResponse::default());
        assert_eq!(sampler.state(), KeyState::default());
    }

    #[test]
    fn test_release_all() {
        let mut sampler = InputSampler::new();
        for key in ["w", "a", "s", "d"] {
            sampler.key_down(key);
        }
        sampler.release_all();
        assert_eq!(sampler.state(), KeyState::default());
    }

    #[test]
    fn test_key_state_set() {
        let mut state = KeyState::default();
        state.set(DriveKey::Right, true);
        assert!(state.is_pressed(DriveKey::Right));
        assert!(!state.is_pressed(DriveKey::Left));
    }
}
