//! Control surface: edge detection over the raw button levels.
//!
//! The buttons are plain digital inputs polled alongside the sensors. A
//! press registers on the rising edge only; the resulting actions are
//! forwarded to the audio thread as control messages.

use crate::messages::ControlMessage;

/// Number of control surface buttons.
pub const NUM_BUTTONS: usize = 4;

const BUTTON_ACTIONS: [ControlMessage; NUM_BUTTONS] = [
    ControlMessage::RecordButton,
    ControlMessage::ClearLoop,
    ControlMessage::ToggleOverdub,
    ControlMessage::NextBank,
];

/// Rising-edge detector for the button bank.
#[derive(Debug, Default)]
pub struct ControlSurface {
    last_levels: [bool; NUM_BUTTONS],
}

impl ControlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares the current levels against the previous poll and returns
    /// the action for each freshly pressed button.
    pub fn update(&mut self, levels: [bool; NUM_BUTTONS]) -> [Option<ControlMessage>; NUM_BUTTONS] {
        let mut actions = [None; NUM_BUTTONS];
        for i in 0..NUM_BUTTONS {
            if levels[i] && !self.last_levels[i] {
                actions[i] = Some(BUTTON_ACTIONS[i]);
            }
        }
        self.last_levels = levels;
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_edge_fires_once() {
        let mut surface = ControlSurface::new();

        let actions = surface.update([true, false, false, false]);
        assert_eq!(actions[0], Some(ControlMessage::RecordButton));

        // Held down: no repeat.
        let actions = surface.update([true, false, false, false]);
        assert_eq!(actions, [None; NUM_BUTTONS]);

        // Released and pressed again: fires again.
        surface.update([false; NUM_BUTTONS]);
        let actions = surface.update([true, false, false, false]);
        assert_eq!(actions[0], Some(ControlMessage::RecordButton));
    }

    #[test]
    fn test_simultaneous_presses() {
        let mut surface = ControlSurface::new();

        let actions = surface.update([false, true, true, false]);

        assert_eq!(actions[1], Some(ControlMessage::ClearLoop));
        assert_eq!(actions[2], Some(ControlMessage::ToggleOverdub));
        assert_eq!(actions[0], None);
        assert_eq!(actions[3], None);
    }

    #[test]
    fn test_release_is_silent() {
        let mut surface = ControlSurface::new();
        surface.update([true; NUM_BUTTONS]);

        let actions = surface.update([false; NUM_BUTTONS]);

        assert_eq!(actions, [None; NUM_BUTTONS]);
    }
}
