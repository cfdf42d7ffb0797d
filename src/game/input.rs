//! Input Edges
//!
//! The window layer reports key presses and releases. The core only ever sees
//! edges, never polled key state; held keys are tracked by whoever cares
//! (the player for movement, the ability book for abilities).

use serde::{Serialize, Deserialize};

// =============================================================================
// KEYS
// =============================================================================

/// Keys the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Arrow up
    Up,
    /// Space bar
    Space,
    /// W
    W,
    /// A
    A,
    /// S
    S,
    /// D
    D,
    /// Number row 1
    Num1,
    /// Number row 2
    Num2,
    /// Number row 3
    Num3,
    /// J
    J,
    /// K
    K,
    /// L
    L,
    /// Enter
    Return,
    /// Escape
    Escape,
}

impl Key {
    /// Ability slot bound to this key (`1`/`J`, `2`/`K`, `3`/`L`).
    pub fn ability_slot(self) -> Option<usize> {
        match self {
            Key::Num1 | Key::J => Some(0),
            Key::Num2 | Key::K => Some(1),
            Key::Num3 | Key::L => Some(2),
            _ => None,
        }
    }

    /// Left/A.
    pub fn is_left(self) -> bool {
        matches!(self, Key::Left | Key::A)
    }

    /// Right/D.
    pub fn is_right(self) -> bool {
        matches!(self, Key::Right | Key::D)
    }

    /// Space/W/Up.
    pub fn is_jump(self) -> bool {
        matches!(self, Key::Space | Key::W | Key::Up)
    }
}

// =============================================================================
// EDGES
// =============================================================================

/// A key changing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEdge {
    /// Rising edge
    Pressed(Key),
    /// Falling edge
    Released(Key),
}

impl InputEdge {
    /// Key involved in the edge.
    pub fn key(self) -> Key {
        match self {
            InputEdge::Pressed(key) | InputEdge::Released(key) => key,
        }
    }

    /// Whether this is a rising edge.
    pub fn is_press(self) -> bool {
        matches!(self, InputEdge::Pressed(_))
    }
}

/// All edges observed since the previous frame, in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Edges in the order they happened
    pub edges: Vec<InputEdge>,
}

impl InputFrame {
    /// Frame with no input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a press edge.
    pub fn press(mut self, key: Key) -> Self {
        self.edges.push(InputEdge::Pressed(key));
        self
    }

    /// Add a release edge.
    pub fn release(mut self, key: Key) -> Self {
        self.edges.push(InputEdge::Released(key));
        self
    }

    /// Add a press immediately followed by a release.
    pub fn tap(self, key: Key) -> Self {
        self.press(key).release(key)
    }

    /// Whether no edges arrived.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_slot_keys() {
        assert_eq!(Key::Num1.ability_slot(), Some(0));
        assert_eq!(Key::K.ability_slot(), Some(1));
        assert_eq!(Key::L.ability_slot(), Some(2));
        assert_eq!(Key::Space.ability_slot(), None);
    }

    #[test]
    fn test_frame_builder_keeps_order() {
        let frame = InputFrame::empty().press(Key::A).tap(Key::J);
        assert_eq!(
            frame.edges,
            vec![
                InputEdge::Pressed(Key::A),
                InputEdge::Pressed(Key::J),
                InputEdge::Released(Key::J),
            ]
        );
        assert!(frame.edges[0].is_press());
        assert_eq!(frame.edges[2].key(), Key::J);
    }
}
