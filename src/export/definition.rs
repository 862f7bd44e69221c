//! Hub instrument definition rendering.
//!
//! A definition is a line-oriented text file describing one instrument as the
//! hub sees it: a header comment, a fixed preamble, then the `[DRUMLANES]`,
//! `[PC]`, `[CC]`, `[NRPN]`, `[ASSIGN]`, `[AUTOMATION]` and `[COMMENT]`
//! sections, always in that order and always present. Rendering is a pure
//! function of its inputs.

use std::collections::HashMap;

use crate::analysis::{self, ResolvedRoute};
use crate::graph::{
    AutomationTarget, Connection, HubPortCode, Instrument, InstrumentId, TrackType,
};

use super::naming;

/// Definition file format version.
pub const FORMAT_VERSION: u32 = 1;

/// Placeholder for absent values.
const NULL: &str = "NULL";

/// Section heading used for mappings without a section.
const DEFAULT_SECTION: &str = "General";

/// Fixed attribution line in the comment section.
pub const ATTRIBUTION: &str = "Generated by Studio Router";

/// NRPN depth written into the `[NRPN]` section.
const NRPN_SECTION_DEPTH: u8 = 7;

/// A rendered definition ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionFile {
    pub instrument: InstrumentId,
    pub hub_port_code: HubPortCode,
    pub filename: String,
    pub text: String,
}

/// Renders the definition for an instrument on a single hub port.
pub fn render(instrument: &Instrument, hub_port_code: HubPortCode, is_analog: bool) -> String {
    let track_name = naming::track_name(&instrument.name, None);
    render_with_track_name(instrument, hub_port_code, is_analog, &track_name)
}

/// Renders the definition with an explicit track name.
pub fn render_with_track_name(
    instrument: &Instrument,
    hub_port_code: HubPortCode,
    is_analog: bool,
    track_name: &str,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "# {} {}",
        instrument.manufacturer.to_uppercase(),
        instrument.name.to_uppercase()
    ));
    lines.push(format!("VERSION {}", FORMAT_VERSION));
    lines.push(format!("TRACKNAME {}", track_name));
    lines.push(format!("TYPE {}", instrument.track_type.keyword()));
    lines.push(format!("OUTPORT {}", hub_port_code));
    if is_analog {
        lines.push(format!("OUTCHAN {}", NULL));
    } else {
        lines.push(format!("OUTCHAN {}", instrument.midi_channel));
    }
    lines.push(format!("INPORT {}", NULL));
    lines.push(format!("INCHAN {}", NULL));
    lines.push(format!("MAXRATE {}", NULL));

    section(&mut lines, "DRUMLANES", drum_lane_lines(instrument));
    section(&mut lines, "PC", Vec::new());
    section(
        &mut lines,
        "CC",
        grouped_lines(
            &instrument.cc_mappings,
            |m| m.section.as_deref(),
            |m| format!("{} {}", m.cc_number, m.name),
        ),
    );
    section(
        &mut lines,
        "NRPN",
        grouped_lines(
            &instrument.nrpn_mappings,
            |m| m.section.as_deref(),
            |m| format!("{}:{}:{} {}", m.msb, m.lsb, NRPN_SECTION_DEPTH, m.name),
        ),
    );
    section(&mut lines, "ASSIGN", assign_lines(instrument));
    section(&mut lines, "AUTOMATION", automation_lines(instrument));
    section(
        &mut lines,
        "COMMENT",
        vec![
            instrument.manufacturer.clone(),
            instrument.name.clone(),
            ATTRIBUTION.to_string(),
        ],
    );

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn section(lines: &mut Vec<String>, name: &str, body: Vec<String>) {
    lines.push(String::new());
    lines.push(format!("[{}]", name));
    lines.extend(body);
    lines.push(format!("[/{}]", name));
}

fn or_null<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NULL.to_string(), |v| v.to_string())
}

fn drum_lane_lines(instrument: &Instrument) -> Vec<String> {
    if instrument.track_type != TrackType::Drum {
        return Vec::new();
    }
    let mut lanes: Vec<_> = instrument.drum_lanes.iter().collect();
    lanes.sort_by(|a, b| b.row.cmp(&a.row));
    lanes
        .into_iter()
        .map(|lane| {
            format!(
                "{}:{}:{}:{} {}",
                lane.row,
                or_null(lane.trig),
                or_null(lane.chan),
                or_null(lane.note),
                lane.name
            )
        })
        .collect()
}

/// Groups entries by section in order of first appearance, each group
/// preceded by a `# section` line. Entry order within a group is kept.
fn grouped_lines<T>(
    entries: &[T],
    section_of: impl Fn(&T) -> Option<&str>,
    line: impl Fn(&T) -> String,
) -> Vec<String> {
    let mut groups: Vec<(&str, Vec<&T>)> = Vec::new();
    for entry in entries {
        let name = section_of(entry).unwrap_or(DEFAULT_SECTION);
        match groups.iter_mut().find(|(section, _)| *section == name) {
            Some((_, members)) => members.push(entry),
            None => groups.push((name, vec![entry])),
        }
    }

    let mut lines = Vec::new();
    for (name, members) in groups {
        lines.push(format!("# {}", name));
        lines.extend(members.into_iter().map(&line));
    }
    lines
}

fn assign_lines(instrument: &Instrument) -> Vec<String> {
    let mut assigns: Vec<_> = instrument.assigns.iter().collect();
    assigns.sort_by_key(|a| a.slot);
    assigns
        .into_iter()
        .map(|a| format!("{} {} {}", a.cc_number, a.name, a.default_value))
        .collect()
}

fn automation_lines(instrument: &Instrument) -> Vec<String> {
    let mut lanes: Vec<_> = instrument.automation_lanes.iter().collect();
    lanes.sort_by_key(|l| l.slot);
    lanes
        .into_iter()
        .map(|lane| match &lane.target {
            AutomationTarget::Cc { cc_number } => format!("CC:{}", cc_number),
            AutomationTarget::PitchBend => "PB:".to_string(),
            AutomationTarget::Aftertouch => "AT:".to_string(),
            AutomationTarget::Cv { cv_number } => format!("CV:{}", cv_number),
            AutomationTarget::Nrpn { msb, lsb, depth } => format!("NRPN:{}:{}:{}", msb, lsb, depth),
        })
        .collect()
}

/// Renders one definition per resolved route of the graph.
///
/// Instruments with more than one route get a `_{code}` suffix on track name
/// and filename. Filenames are unique within the returned batch.
pub fn render_all(instruments: &[Instrument], connections: &[Connection]) -> Vec<DefinitionFile> {
    let routing = analysis::trace(instruments, connections);
    let routes = analysis::resolve(instruments, connections, &routing);
    render_routes(instruments, &routes)
}

/// Renders definitions for already resolved routes.
pub fn render_routes(instruments: &[Instrument], routes: &[ResolvedRoute]) -> Vec<DefinitionFile> {
    let mut route_counts: HashMap<&InstrumentId, usize> = HashMap::new();
    for route in routes {
        *route_counts.entry(&route.instrument).or_default() += 1;
    }

    let mut files: Vec<DefinitionFile> = Vec::with_capacity(routes.len());
    for route in routes {
        let Some(instrument) = instruments.iter().find(|i| i.id == route.instrument) else {
            log::warn!("route names unknown instrument {}", route.instrument);
            continue;
        };
        let suffix = (route_counts[&route.instrument] > 1).then_some(route.hub_port_code);

        let taken: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();
        let filename = naming::dedupe_filename(naming::filename(&instrument.name, suffix), &taken);
        let track_name = naming::track_name(&instrument.name, suffix);

        files.push(DefinitionFile {
            instrument: instrument.id.clone(),
            hub_port_code: route.hub_port_code,
            filename,
            text: render_with_track_name(
                instrument,
                route.hub_port_code,
                route.is_analog,
                &track_name,
            ),
        });
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        AutomationTarget, CcMapping, DrumLane, InstrumentTemplate, LaneChannel, Medium,
        NrpnMapping,
    };

    fn minimal_poly() -> Instrument {
        Instrument::new("inst-2", "Prophet 6", "Sequential").with_channel(3)
    }

    fn section_body<'a>(text: &'a str, name: &str) -> Vec<&'a str> {
        let open = format!("[{}]", name);
        let close = format!("[/{}]", name);
        text.lines()
            .skip_while(|l| *l != open)
            .skip(1)
            .take_while(|l| *l != close)
            .collect()
    }

    #[test]
    fn test_minimal_poly_exact_text() {
        let text = render(&minimal_poly(), HubPortCode::A, false);
        let expected = "\
# SEQUENTIAL PROPHET 6
VERSION 1
TRACKNAME Prophet6
TYPE POLY
OUTPORT A
OUTCHAN 3
INPORT NULL
INCHAN NULL
MAXRATE NULL

[DRUMLANES]
[/DRUMLANES]

[PC]
[/PC]

[CC]
[/CC]

[NRPN]
[/NRPN]

[ASSIGN]
[/ASSIGN]

[AUTOMATION]
[/AUTOMATION]

[COMMENT]
Sequential
Prophet 6
Generated by Studio Router
[/COMMENT]
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let text = render(&minimal_poly(), HubPortCode::B, false);
        let markers: Vec<&str> = text.lines().filter(|l| l.starts_with('[')).collect();
        assert_eq!(
            markers,
            vec![
                "[DRUMLANES]", "[/DRUMLANES]", "[PC]", "[/PC]", "[CC]", "[/CC]", "[NRPN]",
                "[/NRPN]", "[ASSIGN]", "[/ASSIGN]", "[AUTOMATION]", "[/AUTOMATION]",
                "[COMMENT]", "[/COMMENT]",
            ]
        );
    }

    #[test]
    fn test_analog_outchan_is_null() {
        let text = render(&minimal_poly(), HubPortCode::CvGate(2), true);
        assert!(text.contains("OUTPORT CVG2\n"));
        assert!(text.contains("OUTCHAN NULL\n"));
    }

    #[test]
    fn test_drum_lanes_descending_with_nulls() {
        let mut drums = Instrument::new("d", "TR-8S", "Roland").with_track_type(TrackType::Drum);
        drums.set_drum_lane(DrumLane::new(1, "Kick").with_note(36)).unwrap();
        drums
            .set_drum_lane(
                DrumLane::new(2, "Snare")
                    .with_trig(1)
                    .with_chan(LaneChannel::Midi(10))
                    .with_note(38),
            )
            .unwrap();
        drums
            .set_drum_lane(DrumLane::new(3, "Gate Hit").with_chan(LaneChannel::CvGate(1)))
            .unwrap();

        let text = render(&drums, HubPortCode::A, false);
        assert_eq!(
            section_body(&text, "DRUMLANES"),
            vec![
                "3:NULL:CVG1:NULL Gate Hit",
                "2:1:10:38 Snare",
                "1:NULL:NULL:36 Kick",
            ]
        );
        assert!(text.contains("TYPE DRUM\n"));
    }

    #[test]
    fn test_drum_lanes_ignored_for_poly() {
        let mut inst = minimal_poly();
        inst.drum_lanes.push(DrumLane::new(1, "Kick"));
        let text = render(&inst, HubPortCode::A, false);
        assert!(section_body(&text, "DRUMLANES").is_empty());
    }

    #[test]
    fn test_cc_grouped_by_section() {
        let mut inst = minimal_poly();
        inst.cc_mappings = vec![
            CcMapping::new(1, "Mod Wheel"),
            CcMapping::new(71, "Resonance").with_section("Filter"),
            CcMapping::new(74, "Cutoff").with_section("Filter"),
            CcMapping::new(7, "Volume"),
        ];
        let text = render(&inst, HubPortCode::A, false);
        assert_eq!(
            section_body(&text, "CC"),
            vec![
                "# General",
                "1 Mod Wheel",
                "7 Volume",
                "# Filter",
                "71 Resonance",
                "74 Cutoff",
            ]
        );
    }

    #[test]
    fn test_nrpn_depth_is_seven() {
        let mut inst = minimal_poly();
        inst.nrpn_mappings = vec![
            NrpnMapping::new(0, 32, "Osc Shape").with_section("Osc"),
            NrpnMapping::new(1, 5, "Drive"),
        ];
        inst.add_automation_lane(AutomationTarget::Nrpn { msb: 0, lsb: 32, depth: 14 })
            .unwrap();
        let text = render(&inst, HubPortCode::A, false);
        assert_eq!(
            section_body(&text, "NRPN"),
            vec!["# Osc", "0:32:7 Osc Shape", "# General", "1:5:7 Drive"]
        );
        assert_eq!(section_body(&text, "AUTOMATION"), vec!["NRPN:0:32:14"]);
    }

    #[test]
    fn test_assign_and_automation_in_slot_order() {
        let mut inst = minimal_poly();
        inst.add_assign(74, "Cutoff", 64).unwrap();
        inst.add_assign(71, "Reso", 0).unwrap();
        inst.assigns.reverse();
        inst.add_automation_lane(AutomationTarget::Cc { cc_number: 74 }).unwrap();
        inst.add_automation_lane(AutomationTarget::PitchBend).unwrap();
        inst.add_automation_lane(AutomationTarget::Aftertouch).unwrap();
        inst.add_automation_lane(AutomationTarget::Cv { cv_number: 3 }).unwrap();

        let text = render(&inst, HubPortCode::A, false);
        assert_eq!(section_body(&text, "ASSIGN"), vec!["74 Cutoff 64", "71 Reso 0"]);
        assert_eq!(
            section_body(&text, "AUTOMATION"),
            vec!["CC:74", "PB:", "AT:", "CV:3"]
        );
    }

    #[test]
    fn test_out_of_range_counts_render() {
        let mut inst = minimal_poly();
        for slot in 1..=10u8 {
            inst.assigns.push(crate::graph::AssignSlot {
                slot,
                cc_number: slot,
                name: format!("A{}", slot),
                default_value: 0,
            });
        }
        let text = render(&inst, HubPortCode::A, false);
        assert_eq!(section_body(&text, "ASSIGN").len(), 10);
    }

    #[test]
    fn test_render_is_deterministic() {
        let inst = minimal_poly();
        assert_eq!(
            render(&inst, HubPortCode::D, false),
            render(&inst, HubPortCode::D, false)
        );
    }

    #[test]
    fn test_render_all_multi_connection_suffix() {
        let hub = InstrumentTemplate::Hub.build(InstrumentId::from("hub"));
        let mut synth = InstrumentTemplate::PolySynth.build(InstrumentId::from("s"));
        synth.name = "Prophet 6".to_string();
        let mut single = InstrumentTemplate::PolySynth.build(InstrumentId::from("j"));
        single.name = "Juno".to_string();

        let instruments = vec![hub, synth, single];
        let connections = vec![
            Connection::new("hub", "midi_a", "s", "midi_in", Medium::Midi),
            Connection::new("hub", "usb_host", "s", "usb_in", Medium::Usb),
            Connection::new("hub", "midi_b", "j", "midi_in", Medium::Midi),
        ];
        let files = render_all(&instruments, &connections);
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["Prophet_6_A.txt", "Prophet_6_USBH.txt", "Juno.txt"]);

        assert!(files[0].text.contains("TRACKNAME Prophet6_A\n"));
        assert!(files[1].text.contains("TRACKNAME Prophet6_USB\n"));
        assert!(files[1].text.contains("OUTPORT USBH\n"));
        assert!(files[2].text.contains("TRACKNAME Juno\n"));
    }

    #[test]
    fn test_render_all_dedupes_same_names() {
        let hub = InstrumentTemplate::Hub.build(InstrumentId::from("hub"));
        let a = InstrumentTemplate::PolySynth.build(InstrumentId::from("a"));
        let b = InstrumentTemplate::PolySynth.build(InstrumentId::from("b"));
        let connections = vec![
            Connection::new("hub", "midi_a", "a", "midi_in", Medium::Midi),
            Connection::new("hub", "midi_b", "b", "midi_in", Medium::Midi),
        ];
        let files = render_all(&[hub, a, b], &connections);
        assert_eq!(files[0].filename, "Poly_Synth.txt");
        assert_eq!(files[1].filename, "Poly_Synth_2.txt");
    }

    #[test]
    fn test_render_all_empty_without_routes() {
        let hub = InstrumentTemplate::Hub.build(InstrumentId::from("hub"));
        let synth = InstrumentTemplate::PolySynth.build(InstrumentId::from("s"));
        assert!(render_all(&[hub, synth], &[]).is_empty());
    }
}
