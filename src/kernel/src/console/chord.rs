//! Ordered three-key chord detection.

use cgaterm_common::keys::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChordState {
    Idle,
    SawFirst,
    SawSecond,
}

/// What a key did to the chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Not a chord key; the chord restarts from scratch.
    NotChord,
    /// A chord key in the expected position.
    Advanced,
    /// A chord key out of order; the chord restarts from scratch.
    Broken,
    /// The last key of the chord, in order.
    Completed,
}

impl Step {
    /// Chord keys never reach line editing.
    pub(crate) fn consumed(self) -> bool {
        self != Step::NotChord
    }
}

pub(crate) struct ChordRecognizer {
    keys: [Key; 3],
    state: ChordState,
}

impl ChordRecognizer {
    pub(crate) const fn new(keys: [Key; 3]) -> Self {
        Self {
            keys,
            state: ChordState::Idle,
        }
    }

    pub(crate) fn feed(&mut self, key: Key) -> Step {
        // The first key re-arms from any state.
        if key == self.keys[0] {
            self.state = ChordState::SawFirst;
            return Step::Advanced;
        }

        match self.state {
            ChordState::SawFirst if key == self.keys[1] => {
                self.state = ChordState::SawSecond;
                Step::Advanced
            }
            ChordState::SawSecond if key == self.keys[2] => {
                self.state = ChordState::Idle;
                Step::Completed
            }
            _ => {
                self.state = ChordState::Idle;
                if self.keys.contains(&key) {
                    Step::Broken
                } else {
                    Step::NotChord
                }
            }
        }
    }
}
