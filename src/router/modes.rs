//! Mode transitions and their device side effects

use crate::launchpad::{
    Layout, PadColor, PadCommand, BUTTON_CHANNEL, FADER_CHANNEL,
};
use super::mode::{Mode, MixerView, AUX_BUTTON_CCS};
use tracing::info;

impl super::Router {
    /// Switch the active mode, running exit and enter actions
    ///
    /// Leaving the mixer group runs its exit actions regardless of the
    /// destination; switching between mixer views does not.
    pub(crate) fn switch_mode(&mut self, new: Mode) {
        let old = self.mode;
        if old == new {
            return;
        }

        if matches!(old, Mode::Mixer(_)) && !matches!(new, Mode::Mixer(_)) {
            self.leave_mixer_group();
        }

        self.mode = new;
        info!("Mode: {:?} -> {:?}", old, new);

        match new {
            Mode::Session => self.enter_session(),
            Mode::Mixer(view) => self.enter_mixer_view(view),
            Mode::Note | Mode::Custom => {}
        }
    }

    /// Device setup for Session: hand the surface back and show the
    /// session layout
    pub(crate) fn enter_session(&self) {
        self.send_command(PadCommand::DawMode { enabled: false });
        self.send_command(PadCommand::SelectLayout(Layout::Session));
    }

    /// Device setup for one mixer view; also run on view switches inside
    /// the group
    fn enter_mixer_view(&self, view: MixerView) {
        self.send_command(PadCommand::SelectLayout(Layout::Faders));
        self.send_command(PadCommand::SessionColor {
            active: PadColor::Orange.code(),
            inactive: PadColor::SoftWhite.code(),
        });

        let bank = view.bank();
        self.send_command(PadCommand::SetupFaders {
            orientation: bank.orientation,
            polarity: bank.polarity,
            first_cc: bank.first_cc,
            color: bank.color,
        });

        for candidate in MixerView::ALL {
            self.send_command(PadCommand::SetButton {
                cc: candidate.selector_cc(),
                color: if candidate == view {
                    PadColor::SoftGreen
                } else {
                    PadColor::SoftWhite
                },
            });
        }
        for cc in AUX_BUTTON_CCS {
            self.send_command(PadCommand::SetButton {
                cc,
                color: PadColor::Black,
            });
        }

        // bring the on-device faders back to their last known positions
        for (cc, value) in self.mixer_state.replay_range(bank.first_cc..bank.first_cc + 8) {
            self.send_hardware_cc(FADER_CHANNEL, cc, value);
        }
    }

    /// Exit actions of the mixer group: default session colors, then the
    /// right-column buttons as the controller last set them
    fn leave_mixer_group(&self) {
        self.send_command(PadCommand::SessionColor {
            active: 0,
            inactive: 0,
        });

        for (cc, value) in self.button_state.replay() {
            self.send_hardware_cc(BUTTON_CHANNEL, cc, value);
        }
    }
}
