//! Routing of events arriving from the downstream controller

use super::mode::Mode;
use crate::launchpad::BUTTON_CHANNEL;
use crate::midi::{ControlEvent, EventKind, PortId};

impl super::Router {
    /// Process one raw MIDI message from the controller
    pub(crate) fn on_controller_event(&mut self, raw: &[u8]) {
        let event = ControlEvent::from_raw(PortId::Controller, raw);

        if let Some(ev) = event {
            self.record_mixer(&ev);
        }

        // right-column button values from the controller are remembered in
        // every mode, for replay after the mixer views
        let recorded = event.is_some_and(|ev| {
            ev.kind == EventKind::ControlChange
                && ev.channel == BUTTON_CHANNEL
                && self.button_state.contains(ev.id)
        });
        if recorded {
            let ev = event.unwrap();
            self.button_state.record(ev.id, ev.value);
        }

        match self.mode() {
            Mode::Session | Mode::Note | Mode::Custom => {
                self.send_hardware(raw.to_vec());
            }
            Mode::Mixer(_) => {
                // the hardware's right column shows mixer state here; keep
                // the controller's button updates off the device
                if !recorded {
                    self.send_hardware(raw.to_vec());
                }
            }
        }
    }
}
