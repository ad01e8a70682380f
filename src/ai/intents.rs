//! Action intents - the only channel from AI decisions to physics input

/// Kinds of action an AI (or script) can request for one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MoveLeft,
    MoveRight,
    Jump,
    Shoot,
    /// Signed horizontal aim, -1.0 (left) to 1.0 (right)
    AimX,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::MoveLeft,
        ActionKind::MoveRight,
        ActionKind::Jump,
        ActionKind::Shoot,
        ActionKind::AimX,
    ];

    fn slot(self) -> usize {
        match self {
            ActionKind::MoveLeft => 0,
            ActionKind::MoveRight => 1,
            ActionKind::Jump => 2,
            ActionKind::Shoot => 3,
            ActionKind::AimX => 4,
        }
    }
}

/// Per-frame bundle of requested actions. Plain value, built fresh every update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActionIntents {
    slots: [Option<f32>; 5],
}

impl ActionIntents {
    /// No movement, no actions
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Mark a boolean intent as present
    pub fn set(&mut self, kind: ActionKind) -> &mut Self {
        self.slots[kind.slot()] = Some(1.0);
        self
    }

    /// Set a continuous intent (e.g. `AimX`)
    pub fn set_value(&mut self, kind: ActionKind, value: f32) -> &mut Self {
        self.slots[kind.slot()] = Some(value);
        self
    }

    pub fn clear(&mut self, kind: ActionKind) {
        self.slots[kind.slot()] = None;
    }

    pub fn is_set(&self, kind: ActionKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn value(&self, kind: ActionKind) -> Option<f32> {
        self.slots[kind.slot()]
    }

    /// Horizontal input in -1..=1. Left and right together cancel out.
    pub fn move_x(&self) -> f32 {
        let right = if self.is_set(ActionKind::MoveRight) { 1.0 } else { 0.0 };
        let left = if self.is_set(ActionKind::MoveLeft) { 1.0 } else { 0.0 };
        right - left
    }

    /// Set MoveLeft/MoveRight from a signed direction. Zero sets neither.
    pub fn set_move_x(&mut self, direction: f32) -> &mut Self {
        self.clear(ActionKind::MoveLeft);
        self.clear(ActionKind::MoveRight);
        if direction > 0.0 {
            self.set(ActionKind::MoveRight);
        } else if direction < 0.0 {
            self.set(ActionKind::MoveLeft);
        }
        self
    }

    pub fn is_neutral(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Intents that are present, in declaration order
    pub fn active(&self) -> impl Iterator<Item = ActionKind> + '_ {
        ActionKind::ALL.into_iter().filter(|k| self.is_set(*k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_has_nothing_set() {
        let intents = ActionIntents::neutral();
        assert!(intents.is_neutral());
        assert_eq!(intents.move_x(), 0.0);
        assert_eq!(intents.active().count(), 0);
    }

    #[test]
    fn test_move_x_from_left_right() {
        let mut intents = ActionIntents::neutral();
        intents.set(ActionKind::MoveLeft);
        assert_eq!(intents.move_x(), -1.0);
        intents.set(ActionKind::MoveRight);
        assert_eq!(intents.move_x(), 0.0);
        intents.set_move_x(1.0);
        assert_eq!(intents.move_x(), 1.0);
        assert!(!intents.is_set(ActionKind::MoveLeft));
    }

    #[test]
    fn test_aim_value() {
        let mut intents = ActionIntents::neutral();
        intents.set(ActionKind::Shoot).set_value(ActionKind::AimX, -0.6);
        assert!(intents.is_set(ActionKind::Shoot));
        assert_eq!(intents.value(ActionKind::AimX), Some(-0.6));
        assert_eq!(intents.value(ActionKind::Jump), None);
    }
}
