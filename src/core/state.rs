//! Layout physics state machine.

/// PAUSE is initial; `play` enters PLAY, `pause` returns to PAUSE at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhysicsMode {
    Play,
    #[default]
    Pause,
}
