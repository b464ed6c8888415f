//! Routing of events arriving from the Launchpad

use super::mode::{Mode, MixerView, CUSTOM_LAYOUT_CC, MODE_TOGGLE_CC, NOTE_LAYOUT_CC};
use crate::launchpad::BUTTON_CHANNEL;
use crate::midi::{ControlEvent, EventKind, PortId};

impl super::Router {
    /// Process one raw MIDI message from the hardware
    ///
    /// Transitions fire first, so the triggering press is then routed under
    /// the rules of the mode it switched to.
    pub(crate) async fn on_hardware_event(&mut self, raw: &[u8]) {
        let event = ControlEvent::from_raw(PortId::Hardware, raw);

        if let Some(ev) = event {
            self.record_mixer(&ev);
            self.check_transition(&ev);
        }

        match self.mode() {
            Mode::Session => {
                self.send_controller(raw.to_vec());

                // grid presses additionally drive the sequencer
                if let Some(ev) = event {
                    if ev.kind == EventKind::NoteOn && ev.channel == BUTTON_CHANNEL {
                        if let Some(echo) = self.bridge.on_hardware_press(ev.id, ev.value).await
                        {
                            self.send_command(echo);
                        }
                    }
                }
            }
            Mode::Note | Mode::Custom => {
                self.send_controller(raw.to_vec());
            }
            Mode::Mixer(_) => {
                // the right-column buttons belong to the mixer view here;
                // their presses stay local
                let intercepted = event.is_some_and(|ev| {
                    ev.kind == EventKind::ControlChange
                        && ev.channel == BUTTON_CHANNEL
                        && self.button_state.contains(ev.id)
                });
                if !intercepted {
                    self.send_controller(raw.to_vec());
                }
            }
        }
    }

    /// Run a mode transition if the event is one of the mode buttons
    /// (full-value press on the button channel)
    fn check_transition(&mut self, event: &ControlEvent) {
        if event.kind != EventKind::ControlChange
            || event.channel != BUTTON_CHANNEL
            || event.value != 127
        {
            return;
        }

        match event.id {
            MODE_TOGGLE_CC => {
                let target = if self.mode() == Mode::Session {
                    Mode::Mixer(MixerView::Volume)
                } else {
                    Mode::Session
                };
                self.switch_mode(target);
            }
            NOTE_LAYOUT_CC => self.switch_mode(Mode::Note),
            CUSTOM_LAYOUT_CC => self.switch_mode(Mode::Custom),
            cc => {
                if let Mode::Mixer(_) = self.mode() {
                    if let Some(view) = MixerView::from_selector(cc) {
                        self.switch_mode(Mode::Mixer(view));
                    }
                }
            }
        }
    }
}
