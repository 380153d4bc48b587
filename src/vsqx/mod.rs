//! VOCALOID3 project (`.vsqx`) writer.
//!
//! The document is built as text: one voice, one track, one musical part
//! holding every note and controller point of a [`Sequence`].

pub mod phonemes;
pub mod singers;

pub use phonemes::{FALLBACK_PHONEMES, lookup_phonemes};
pub use singers::{Singer, default_singer, find_singer, resolve_singer, singer_names};

use crate::defaults;
use crate::error::Result;
use crate::sequence::{NoteEvent, Sequence};
use std::path::Path;

const NAMESPACE: &str = "http://www.yamaha.co.jp/vocaloid/schema/vsq3/";
const SCHEMA_LOCATION: &str = "http://www.yamaha.co.jp/vocaloid/schema/vsq3/vsq3.xsd";
const VENDOR: &str = "Yamaha corporation";
const VERSION: &str = "3.0.0.11";

const PRE_MEASURE: i64 = 4;
const BEATS_PER_MEASURE: i64 = 4;
/// Shortest part length written, in ticks.
const MIN_PLAY_TIME: i64 = 614_400;

const STYLE_PLUGIN_ID: &str = "ACA9C502-A04B-42b5-B2EB-5CEA36D16FCE";
const STYLE_PLUGIN_NAME: &str = "VOCALOID2 Compatible Style";
const STYLE_PLUGIN_VERSION: &str = "3.0.0.1";

const PART_STYLE: [(&str, i32); 7] = [
    ("accent", 50),
    ("bendDep", 8),
    ("bendLen", 0),
    ("decay", 50),
    ("fallPort", 0),
    ("opening", 127),
    ("risePort", 0),
];

const NOTE_STYLE: [(&str, i32); 9] = [
    ("accent", 50),
    ("bendDep", 8),
    ("bendLen", 0),
    ("decay", 50),
    ("fallPort", 0),
    ("opening", 127),
    ("risePort", 0),
    ("vibLen", 0),
    ("vibType", 0),
];

const AUX_ID: &str = "AUX_VST_HOST_CHUNK_INFO";
const AUX_CONTENT: &str = "VlNDSwAAAAADAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// Escape text for use in an attribute or element body.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Wrap text in a CDATA section, splitting any embedded terminator.
pub fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

/// Indenting element writer.
struct Xml {
    out: String,
    depth: usize,
}

impl Xml {
    fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, tag: &str) {
        self.line(&format!("<{tag}>"));
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{tag}>"));
    }

    fn empty(&mut self, tag: &str) {
        self.line(&format!("<{tag}></{tag}>"));
    }

    fn value(&mut self, tag: &str, value: impl std::fmt::Display) {
        self.line(&format!("<{tag}>{value}</{tag}>"));
    }

    fn text(&mut self, tag: &str, text: &str) {
        self.line(&format!("<{tag}>{}</{tag}>", cdata(text)));
    }

    fn attr(&mut self, id: &str, value: impl std::fmt::Display) {
        self.line(&format!("<attr id=\"{}\">{value}</attr>", escape_xml(id)));
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Phoneme string and lock flag for a note.
fn note_phonemes(note: &NoteEvent) -> (&str, bool) {
    if let Some(phoneme) = note.phoneme.as_deref() {
        return (phoneme, true);
    }
    match lookup_phonemes(&note.lyric) {
        Some(phonemes) => (phonemes, true),
        None => (FALLBACK_PHONEMES, false),
    }
}

/// Serializes a [`Sequence`] as a single-track vsq3 document.
#[derive(Debug, Clone, Copy)]
pub struct VsqxWriter {
    pub singer: &'static Singer,
    pub resolution: u32,
    pub bpm: f64,
}

impl Default for VsqxWriter {
    fn default() -> Self {
        Self::new(default_singer())
    }
}

impl VsqxWriter {
    pub fn new(singer: &'static Singer) -> Self {
        Self {
            singer,
            resolution: defaults::RESOLUTION,
            bpm: defaults::BPM,
        }
    }

    pub fn with_timing(mut self, resolution: u32, bpm: f64) -> Self {
        self.resolution = resolution;
        self.bpm = bpm;
        self
    }

    /// Tick at which the musical part starts, after the pre-measures.
    pub fn part_start(&self) -> i64 {
        PRE_MEASURE * BEATS_PER_MEASURE * self.resolution as i64
    }

    pub fn render(&self, sequence: &Sequence) -> String {
        let mut xml = Xml::new();
        xml.line(&format!(
            "<vsq3 xmlns=\"{NAMESPACE}\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             xsi:schemaLocation=\"{SCHEMA_LOCATION}\">"
        ));
        xml.depth += 1;
        xml.text("vender", VENDOR);
        xml.text("version", VERSION);

        self.voice_table(&mut xml);
        Self::mixer(&mut xml);
        self.master_track(&mut xml);
        self.vs_track(&mut xml, sequence);

        xml.empty("seTrack");
        xml.empty("karaokeTrack");
        xml.open("aux");
        xml.text("auxID", AUX_ID);
        xml.text("content", AUX_CONTENT);
        xml.close("aux");
        xml.close("vsq3");
        xml.finish()
    }

    /// Render and write the document to `path`.
    pub fn save(&self, sequence: &Sequence, path: &Path) -> Result<()> {
        std::fs::write(path, self.render(sequence))?;
        tracing::info!(
            path = %path.display(),
            notes = sequence.notes().len(),
            controls = sequence.controls().len(),
            singer = self.singer.name,
            "wrote vsqx"
        );
        Ok(())
    }

    fn voice_table(&self, xml: &mut Xml) {
        xml.open("vVoiceTable");
        xml.open("vVoice");
        xml.value("vBS", self.singer.bank_select);
        xml.value("vPC", 0);
        xml.text("compID", self.singer.comp_id);
        xml.text("vVoiceName", self.singer.name);
        xml.open("vVoiceParam");
        for tag in ["bre", "bri", "cle", "gen", "ope"] {
            xml.value(tag, 0);
        }
        xml.close("vVoiceParam");
        xml.close("vVoice");
        xml.close("vVoiceTable");
    }

    fn mixer(xml: &mut Xml) {
        xml.open("mixer");

        xml.open("masterUnit");
        xml.value("outDev", 0);
        xml.value("retLevel", 0);
        xml.value("vol", 0);
        xml.close("masterUnit");

        xml.open("vsUnit");
        xml.value("vsTrackNo", 0);
        Self::channel_strip(xml);
        xml.close("vsUnit");

        xml.open("seUnit");
        Self::channel_strip(xml);
        xml.close("seUnit");

        xml.open("karaokeUnit");
        xml.value("inGain", 0);
        xml.value("mute", 0);
        xml.value("solo", 0);
        xml.value("vol", -129);
        xml.close("karaokeUnit");

        xml.close("mixer");
    }

    fn channel_strip(xml: &mut Xml) {
        xml.value("inGain", 0);
        xml.value("sendLevel", -898);
        xml.value("sendEnable", 0);
        xml.value("mute", 0);
        xml.value("solo", 0);
        xml.value("pan", 64);
        xml.value("vol", 0);
    }

    fn master_track(&self, xml: &mut Xml) {
        xml.open("masterTrack");
        xml.text("seqName", "none");
        xml.text("comment", "none");
        xml.value("resolution", self.resolution);
        xml.value("preMeasure", PRE_MEASURE);
        xml.open("timeSig");
        xml.value("posMes", 0);
        xml.value("nume", BEATS_PER_MEASURE);
        xml.value("denomi", 4);
        xml.close("timeSig");
        xml.open("tempo");
        xml.value("posTick", 0);
        xml.value("bpm", (self.bpm * 100.0).round() as i64);
        xml.close("tempo");
        xml.close("masterTrack");
    }

    fn vs_track(&self, xml: &mut Xml, sequence: &Sequence) {
        xml.open("vsTrack");
        xml.value("vsTrackNo", 0);
        xml.text("trackName", "Track");
        xml.text("comment", "Track");

        xml.open("musicalPart");
        xml.value("posTick", self.part_start());
        xml.value("playTime", sequence.end_tick().max(MIN_PLAY_TIME));
        xml.text("partName", "NewPart");
        xml.text("comment", "New Musical Part");

        xml.open("stylePlugin");
        xml.text("stylePluginID", STYLE_PLUGIN_ID);
        xml.text("stylePluginName", STYLE_PLUGIN_NAME);
        xml.text("version", STYLE_PLUGIN_VERSION);
        xml.close("stylePlugin");

        xml.open("partStyle");
        for (id, value) in PART_STYLE {
            xml.attr(id, value);
        }
        xml.close("partStyle");

        xml.open("singer");
        xml.value("posTick", 0);
        xml.value("vBS", self.singer.bank_select);
        xml.value("vPC", 0);
        xml.close("singer");

        for event in sequence.controls() {
            xml.open("mCtrl");
            xml.value("posTick", event.tick);
            xml.attr(event.control.id(), event.control.value());
            xml.close("mCtrl");
        }

        for note in sequence.notes() {
            Self::note(xml, note);
        }

        xml.close("musicalPart");
        xml.close("vsTrack");
    }

    fn note(xml: &mut Xml, note: &NoteEvent) {
        xml.open("note");
        xml.value("posTick", note.begin_tick);
        xml.value("durTick", note.duration_ticks());
        xml.value("noteNum", note.note_number);
        xml.value("velocity", note.velocity);
        xml.text("lyric", &note.lyric);
        let (phonemes, locked) = note_phonemes(note);
        if locked {
            xml.line(&format!("<phnms lock=\"1\">{}</phnms>", cdata(phonemes)));
        } else {
            xml.text("phnms", phonemes);
        }
        xml.open("noteStyle");
        for (id, value) in NOTE_STYLE {
            xml.attr(id, value);
        }
        xml.close("noteStyle");
        xml.close("note");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Control, NoteSink};

    fn note(begin: i64, end: i64, lyric: &str, phoneme: Option<&str>) -> NoteEvent {
        NoteEvent {
            begin_tick: begin,
            end_tick: end,
            note_number: 69,
            velocity: 64,
            lyric: lyric.to_string(),
            phoneme: phoneme.map(str::to_string),
        }
    }

    fn sample_sequence() -> Sequence {
        let mut seq = Sequence::new();
        seq.add_control(0, Control::BendSensitivity(24));
        seq.add_control(10, Control::PitchBend(-341));
        seq.add_note(note(100, 300, "か", None));
        seq.add_note(note(300, 360, "っ", Some("Sil")));
        seq.add_note(note(400, 500, "ヴぁ", None));
        seq
    }

    #[test]
    fn document_has_header_and_tracks() {
        let doc = VsqxWriter::default().render(&Sequence::new());

        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<vsq3 "));
        assert!(doc.contains("<vender><![CDATA[Yamaha corporation]]></vender>"));
        assert!(doc.contains("<compID><![CDATA[BNRCB9XYKM2GYNCE]]></compID>"));
        assert!(doc.contains("<vVoiceName><![CDATA[Yukari_Onn]]></vVoiceName>"));
        assert!(doc.contains("<seTrack></seTrack>"));
        assert!(doc.contains("<karaokeTrack></karaokeTrack>"));
        assert!(doc.trim_end().ends_with("</vsq3>"));
    }

    #[test]
    fn tempo_is_hundredths_of_bpm() {
        let doc = VsqxWriter::default().render(&Sequence::new());
        assert!(doc.contains("<bpm>12500</bpm>"));
        assert!(doc.contains("<resolution>480</resolution>"));
        assert!(doc.contains("<posTick>7680</posTick>"));
        assert!(doc.contains("<playTime>614400</playTime>"));
    }

    #[test]
    fn custom_timing_moves_part_start() {
        let writer = VsqxWriter::default().with_timing(960, 120.5);
        let doc = writer.render(&Sequence::new());
        assert_eq!(writer.part_start(), 15360);
        assert!(doc.contains("<bpm>12050</bpm>"));
        assert!(doc.contains("<resolution>960</resolution>"));
    }

    #[test]
    fn controls_become_mctrl_entries() {
        let doc = VsqxWriter::default().render(&sample_sequence());
        assert!(doc.contains("<attr id=\"PBS\">24</attr>"));
        assert!(doc.contains("<attr id=\"PIT\">-341</attr>"));
        let pit = doc.find("PIT").unwrap();
        let first_note = doc.find("<note>").unwrap();
        assert!(pit < first_note);
    }

    #[test]
    fn phonemes_are_locked_unless_unknown() {
        let doc = VsqxWriter::default().render(&sample_sequence());

        assert!(doc.contains("<lyric><![CDATA[か]]></lyric>"));
        assert!(doc.contains("<phnms lock=\"1\"><![CDATA[k a]]></phnms>"));
        assert!(doc.contains("<phnms lock=\"1\"><![CDATA[Sil]]></phnms>"));
        assert!(doc.contains("<phnms><![CDATA[4 a]]></phnms>"));
    }

    #[test]
    fn note_timing_fields() {
        let doc = VsqxWriter::default().render(&sample_sequence());
        assert!(doc.contains("<posTick>100</posTick>"));
        assert!(doc.contains("<durTick>200</durTick>"));
        assert!(doc.contains("<noteNum>69</noteNum>"));
        assert!(doc.contains("<velocity>64</velocity>"));
        assert_eq!(doc.matches("<note>").count(), 3);
        assert_eq!(doc.matches("<attr id=\"vibType\">0</attr>").count(), 3);
    }

    #[test]
    fn long_sequences_extend_play_time() {
        let mut seq = Sequence::new();
        seq.add_note(note(0, 700_000, "あ", None));
        let doc = VsqxWriter::default().render(&seq);
        assert!(doc.contains("<playTime>700000</playTime>"));
    }

    #[test]
    fn cdata_terminator_is_split() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
        assert_eq!(escape_xml("<a & 'b'>"), "&lt;a &amp; &apos;b&apos;&gt;");
    }

    #[test]
    fn singer_selects_voice() {
        let singer = find_singer("IA").unwrap();
        let doc = VsqxWriter::new(singer).render(&Sequence::new());
        assert!(doc.contains("<compID><![CDATA[BLRGDDR4M3WM2LC6]]></compID>"));
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.vsqx");
        VsqxWriter::default().save(&sample_sequence(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<vsq3 "));
    }
}
