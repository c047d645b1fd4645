use pitmux_abi::TimerResult;
use pitmux_abi::arch::x86_64::{Port, SpeakerGate};

use super::platform::PitPlatform;
use super::Pit;

impl<P: PitPlatform> Pit<P> {
    /// Drive the speaker with a square wave at `frequency_hz`.
    pub fn play_tone(&self, frequency_hz: u32) -> TimerResult<()> {
        self.set_t2_frequency(frequency_hz)?;
        self.set_speaker_gate(true);
        Ok(())
    }

    /// Silence the speaker. Channel 2 keeps its countdown.
    pub fn mute_tone(&self) {
        self.set_speaker_gate(false);
    }

    pub fn tone_enabled(&self) -> bool {
        let control = self.platform.inb(Port::SYSTEM_CONTROL_B);
        SpeakerGate::from_bits_truncate(control).contains(SpeakerGate::ENABLED)
    }

    fn set_speaker_gate(&self, enabled: bool) {
        self.platform.without_interrupts(|| {
            let control = self.platform.inb(Port::SYSTEM_CONTROL_B);
            let gate = SpeakerGate::ENABLED.bits();
            let control = if enabled { control | gate } else { control & !gate };
            self.platform.outb(Port::SYSTEM_CONTROL_B, control);
        });
    }
}
