//! Instrument templates for the studio graph.
//!
//! Defines the starting points a user picks from when adding an instrument,
//! including the hub sequencer itself.

use super::hub::{
    ANALOG_CHANNELS, CV_HANDLE_PREFIX, GATE_HANDLE_PREFIX, HANDLE_MIDI_A, HANDLE_MIDI_B,
    HANDLE_MIDI_C, HANDLE_MIDI_D, HANDLE_USB_DEVICE, HANDLE_USB_HOST,
};
use super::instrument::{Instrument, InstrumentId, TrackType};
use super::port::Port;

/// Templates for all instrument kinds that can be added to a studio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrumentTemplate {
    /// The hub sequencer. Exactly one per studio.
    Hub,
    /// Polyphonic synth with MIDI in/thru and stereo audio out.
    PolySynth,
    /// Drum machine with MIDI in/thru and audio out.
    DrumMachine,
    /// MPE controller-friendly synth.
    MpeSynth,
    /// Eurorack voice driven by CV and gate.
    CvVoice,
    /// MIDI thru box splitting one input to four outputs.
    MidiThru,
    /// Audio effect unit.
    AudioEffect,
}

impl InstrumentTemplate {
    /// Get the display label for this template.
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentTemplate::Hub => "Hub Sequencer",
            InstrumentTemplate::PolySynth => "Poly Synth",
            InstrumentTemplate::DrumMachine => "Drum Machine",
            InstrumentTemplate::MpeSynth => "MPE Synth",
            InstrumentTemplate::CvVoice => "CV Voice",
            InstrumentTemplate::MidiThru => "MIDI Thru",
            InstrumentTemplate::AudioEffect => "Audio Effect",
        }
    }

    /// Builds an instrument from this template with the given id.
    pub fn build(&self, id: InstrumentId) -> Instrument {
        let base = Instrument::new(id, self.label(), "Generic");
        match self {
            InstrumentTemplate::Hub => {
                let mut hub = Instrument {
                    manufacturer: "Hub".to_string(),
                    ..base
                };
                hub.is_hub = true;
                hub.show_cv_ports = true;
                hub.inputs = vec![
                    Port::midi("midi_in_a", "MIDI In A"),
                    Port::midi("midi_in_b", "MIDI In B"),
                    Port::usb("usb_device_in", "USB Device In"),
                ];
                hub.outputs = vec![
                    Port::midi(HANDLE_MIDI_A, "MIDI Out A"),
                    Port::midi(HANDLE_MIDI_B, "MIDI Out B"),
                    Port::midi(HANDLE_MIDI_C, "MIDI Out C"),
                    Port::midi(HANDLE_MIDI_D, "MIDI Out D"),
                    Port::usb(HANDLE_USB_HOST, "USB Host"),
                    Port::usb(HANDLE_USB_DEVICE, "USB Device"),
                ];
                for n in 1..=ANALOG_CHANNELS {
                    hub.outputs
                        .push(Port::cv(format!("{}{}", CV_HANDLE_PREFIX, n), format!("CV {}", n)));
                }
                for n in 1..=ANALOG_CHANNELS {
                    hub.outputs.push(Port::cv(
                        format!("{}{}", GATE_HANDLE_PREFIX, n),
                        format!("Gate {}", n),
                    ));
                }
                hub
            }
            InstrumentTemplate::PolySynth => base
                .with_input(Port::midi("midi_in", "MIDI In"))
                .with_input(Port::usb("usb_in", "USB"))
                .with_output(Port::midi("midi_thru", "MIDI Thru"))
                .with_output(Port::audio("audio_l", "Out L"))
                .with_output(Port::audio("audio_r", "Out R")),
            InstrumentTemplate::DrumMachine => base
                .with_track_type(TrackType::Drum)
                .with_channel(10)
                .with_input(Port::midi("midi_in", "MIDI In"))
                .with_output(Port::midi("midi_thru", "MIDI Thru"))
                .with_output(Port::audio("audio_out", "Main Out")),
            InstrumentTemplate::MpeSynth => base
                .with_track_type(TrackType::Mpe)
                .with_input(Port::midi("midi_in", "MIDI In"))
                .with_input(Port::usb("usb_in", "USB"))
                .with_output(Port::audio("audio_out", "Out")),
            InstrumentTemplate::CvVoice => {
                let mut voice = base
                    .with_input(Port::cv("pitch", "Pitch"))
                    .with_input(Port::cv("gate", "Gate"))
                    .with_output(Port::audio("audio_out", "Out"));
                voice.show_cv_ports = true;
                voice
            }
            InstrumentTemplate::MidiThru => {
                let mut thru = base.with_input(Port::midi("midi_in", "MIDI In"));
                for n in 1..=4 {
                    thru = thru
                        .with_output(Port::midi(format!("thru_{}", n), format!("Thru {}", n)));
                }
                thru
            }
            InstrumentTemplate::AudioEffect => base
                .with_input(Port::audio("audio_in", "In"))
                .with_input(Port::midi("midi_in", "MIDI In"))
                .with_output(Port::audio("audio_out", "Out")),
        }
    }
}
