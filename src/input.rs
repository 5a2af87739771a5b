//! Held-key state fed by key-down/key-up events.

/// Logical driving keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LogicalKey {
    Forward,
    Left,
    Back,
    Right,
    Boost,
}

impl LogicalKey {
    /// Maps a physical key code (`KeyboardEvent.code` naming) to a logical key.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(LogicalKey::Forward),
            "KeyA" => Some(LogicalKey::Left),
            "KeyS" => Some(LogicalKey::Back),
            "KeyD" => Some(LogicalKey::Right),
            "Space" => Some(LogicalKey::Boost),
            _ => None,
        }
    }
}

/// Level-based key state: a flag is true while its key is held.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub left: bool,
    pub back: bool,
    pub right: bool,
    pub boost: bool,
}

impl InputState {
    pub fn held(&self, key: LogicalKey) -> bool {
        match key {
            LogicalKey::Forward => self.forward,
            LogicalKey::Left => self.left,
            LogicalKey::Back => self.back,
            LogicalKey::Right => self.right,
            LogicalKey::Boost => self.boost,
        }
    }

    pub fn set(&mut self, key: LogicalKey, held: bool) {
        let flag = match key {
            LogicalKey::Forward => &mut self.forward,
            LogicalKey::Left => &mut self.left,
            LogicalKey::Back => &mut self.back,
            LogicalKey::Right => &mut self.right,
            LogicalKey::Boost => &mut self.boost,
        };
        *flag = held;
    }

    /// Applies a key edge. Returns true when the key was recognized, in which
    /// case the host should suppress its default handling of the event.
    pub fn press(&mut self, code: &str, is_down: bool) -> bool {
        match LogicalKey::from_code(code) {
            Some(key) => {
                self.set(key, is_down);
                true
            }
            None => false,
        }
    }

    pub fn key_down(&mut self, code: &str) -> bool {
        self.press(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.press(code, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_then_up_clears_flag() {
        let mut input = InputState::default();
        assert!(input.key_down("KeyA"));
        assert!(input.left);
        assert!(input.key_up("KeyA"));
        assert!(!input.left);
    }

    #[test]
    fn held_key_stays_held() {
        let mut input = InputState::default();
        input.key_down("KeyA");
        // OS key repeat delivers more downs; state is level-based
        for _ in 0..100 {
            input.key_down("KeyA");
        }
        assert!(input.left);
        assert_eq!(input, InputState { left: true, ..InputState::default() });
    }

    #[test]
    fn unknown_keys_are_ignored_and_not_consumed() {
        let mut input = InputState { forward: true, ..InputState::default() };
        let before = input;
        assert!(!input.key_down("KeyQ"));
        assert!(!input.key_up("Escape"));
        assert!(!input.key_down("keyw"));
        assert_eq!(input, before);
    }

    #[test]
    fn every_code_maps_to_its_flag() {
        for (code, key) in [
            ("KeyW", LogicalKey::Forward),
            ("KeyA", LogicalKey::Left),
            ("KeyS", LogicalKey::Back),
            ("KeyD", LogicalKey::Right),
            ("Space", LogicalKey::Boost),
        ] {
            let mut input = InputState::default();
            input.key_down(code);
            assert!(input.held(key), "{} should hold {:?}", code, key);
            input.key_up(code);
            assert_eq!(input, InputState::default());
        }
    }
}
