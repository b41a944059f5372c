use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::{Key as WinitKey, NamedKey as WinitNamedKey};

/// Logical key as reported by the host, mirroring `KeyboardEvent.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Named(NamedKey),
    /// Printable character, case preserved.
    Character(char),
}

impl Key {
    /// Parses a DOM key name such as `"h"`, `"ArrowUp"` or `"Escape"`.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(Self::Character(ch)),
            _ => None,
        }
    }

    /// Maps a winit logical key; keys the demo never reacts to give `None`.
    pub fn from_winit(key: &WinitKey) -> Option<Self> {
        match key {
            WinitKey::Character(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(Self::Character(ch)),
                    _ => None,
                }
            }
            WinitKey::Named(named) => Some(Self::Named(match named {
                WinitNamedKey::Space => NamedKey::Space,
                WinitNamedKey::Enter => NamedKey::Enter,
                WinitNamedKey::Tab => NamedKey::Tab,
                WinitNamedKey::ArrowLeft => NamedKey::ArrowLeft,
                WinitNamedKey::ArrowRight => NamedKey::ArrowRight,
                WinitNamedKey::ArrowUp => NamedKey::ArrowUp,
                WinitNamedKey::ArrowDown => NamedKey::ArrowDown,
                WinitNamedKey::Escape => NamedKey::Escape,
                WinitNamedKey::Shift => NamedKey::Shift,
                _ => return None,
            })),
            _ => None,
        }
    }

    pub fn as_char(self) -> Option<char> {
        match self {
            Self::Character(ch) => Some(ch),
            Self::Named(NamedKey::Space) => Some(' '),
            Self::Named(_) => None,
        }
    }
}

fn parse_named_key(name: &str) -> Option<Key> {
    use NamedKey::*;
    let key = match name {
        " " | "Space" => Space,
        "Enter" => Enter,
        "Tab" => Tab,
        "ArrowLeft" | "Left" => ArrowLeft,
        "ArrowRight" | "Right" => ArrowRight,
        "ArrowUp" | "Up" => ArrowUp,
        "ArrowDown" | "Down" => ArrowDown,
        "Escape" | "Esc" => Escape,
        "Shift" => Shift,
        _ => return None,
    };
    Some(Key::Named(key))
}

/// Non-printable keys the demo reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Shift,
}

/// Pointer button in DOM numbering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
}

impl PointerButton {
    /// Maps a DOM `MouseEvent.button` index.
    pub fn from_index(index: u16) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Auxiliary),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }

    pub fn from_winit(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::Primary),
            MouseButton::Middle => Some(Self::Auxiliary),
            MouseButton::Right => Some(Self::Secondary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(
            Key::from_name("ArrowUp"),
            Some(Key::Named(NamedKey::ArrowUp))
        );
        assert_eq!(Key::from_name("h"), Some(Key::Character('h')));
        assert_eq!(Key::from_name("F12"), None);
    }

    #[test]
    fn character_case_is_preserved() {
        assert_ne!(Key::from_name("H"), Key::from_name("h"));
        assert_eq!(Key::from_name("H").and_then(Key::as_char), Some('H'));
    }

    #[test]
    fn pointer_buttons_follow_dom_order() {
        assert_eq!(PointerButton::from_index(0), Some(PointerButton::Primary));
        assert_eq!(PointerButton::from_index(2), Some(PointerButton::Secondary));
        assert_eq!(PointerButton::from_index(7), None);
    }

    #[test]
    fn winit_keys_map_like_dom_keys() {
        assert_eq!(
            Key::from_winit(&WinitKey::Character("h".into())),
            Key::from_name("h")
        );
        assert_eq!(
            Key::from_winit(&WinitKey::Named(WinitNamedKey::Space)),
            Some(Key::Named(NamedKey::Space))
        );
        assert_eq!(
            Key::from_winit(&WinitKey::Named(WinitNamedKey::Shift)),
            Some(Key::Named(NamedKey::Shift))
        );
        assert_eq!(Key::from_winit(&WinitKey::Named(WinitNamedKey::F12)), None);
        assert_eq!(Key::from_winit(&WinitKey::Character("ab".into())), None);
    }

    #[test]
    fn winit_buttons_follow_dom_order() {
        assert_eq!(
            PointerButton::from_winit(MouseButton::Middle),
            Some(PointerButton::Auxiliary)
        );
        assert_eq!(
            PointerButton::from_winit(MouseButton::Right),
            PointerButton::from_index(2)
        );
        assert_eq!(PointerButton::from_winit(MouseButton::Back), None);
    }
}
