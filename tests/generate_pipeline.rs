//! End-to-end generation with a mock pitch track and prepared labels.

use std::sync::Arc;
use talkseq::audio::AudioInput;
use talkseq::contour::LowPassCutoff;
use talkseq::segment::{LabelFileSegmenter, Segment, parse_labels};
use talkseq::sequence::Control;
use talkseq::vocoder::MockVocoder;
use talkseq::vsqx::{VsqxWriter, find_singer};
use talkseq::{Config, GenerateRequest, Orchestrator, TalkseqError};

const LABELS: &str = "\
0.0000000 0.1000000 silB
0.1000000 0.1500000 k
0.1500000 0.3000000 o
0.3000000 0.3600000 N
0.3600000 0.4100000 n
0.4100000 0.5500000 i
0.5500000 0.6000000 ch
0.6000000 0.7500000 i
0.7500000 0.8000000 w
0.8000000 1.0000000 a:
1.0000000 1.1000000 silE
";

fn silent_audio(secs: f64) -> AudioInput {
    AudioInput::from_samples(vec![0.0; (secs * 16000.0) as usize], 16000)
}

/// Rising glide from 200 Hz towards 300 Hz.
fn glide(frames: usize) -> Vec<f64> {
    (0..frames)
        .map(|i| 200.0 + 100.0 * i as f64 / frames as f64)
        .collect()
}

fn orchestrator(config: &Config, f0: Vec<f64>) -> Orchestrator {
    let segments = parse_labels(LABELS).unwrap();
    Orchestrator::new(
        Arc::new(MockVocoder::new(f0)),
        Arc::new(LabelFileSegmenter::from_segments(segments)),
    )
    .with_config(config.orchestrator_config())
}

#[test]
fn greeting_becomes_five_notes() {
    let config = Config::default();
    let report = orchestrator(&config, glide(220))
        .run(&GenerateRequest::new(silent_audio(1.1), "こんにちわ"))
        .unwrap();

    let notes = report.sequence.notes();
    let lyrics: Vec<&str> = notes.iter().map(|n| n.lyric.as_str()).collect();
    assert_eq!(lyrics, ["こ", "ん", "に", "ち", "わ"]);

    // Notes never go backwards and every one sits on the contour center.
    assert!(notes.windows(2).all(|w| w[0].begin_tick <= w[1].begin_tick));
    assert!(notes.iter().all(|n| n.note_number == report.center));
    assert!(notes.iter().all(|n| (1..=127).contains(&n.velocity)));

    // k+o spans consonant begin to vowel end plus the extension, then
    // gets clipped where the nasal starts.
    assert_eq!(notes[0].begin_tick, 100);
    assert_eq!(notes[0].end_tick, 300);
    assert_eq!((notes[1].begin_tick, notes[1].end_tick), (300, 360));

    // Each following pair pulls the previous note's end back to its start.
    assert_eq!(notes[2].end_tick, 550);
    assert_eq!(notes[3].end_tick, 750);

    // The lengthened final vowel gets both extensions.
    let last = notes.last().unwrap();
    assert_eq!(last.begin_tick, 750);
    assert_eq!(last.end_tick, 1100);
}

#[test]
fn bends_cover_the_glide() {
    let config = Config::default();
    let report = orchestrator(&config, glide(220))
        .run(&GenerateRequest::new(silent_audio(1.1), ""))
        .unwrap();

    let controls = report.sequence.controls();
    assert_eq!(controls[0].tick, 0);
    assert_eq!(controls[0].control, Control::BendSensitivity(24));

    let bends: Vec<(i64, i16)> = controls
        .iter()
        .filter_map(|c| match c.control {
            Control::PitchBend(v) => Some((c.tick, v)),
            _ => None,
        })
        .collect();
    assert_eq!(bends.len(), report.bend_points);
    assert!(bends.windows(2).all(|w| w[0].0 < w[1].0));
    // Repeats are dropped, so a rising glide yields rising values
    // that start below the center and end above it.
    assert!(bends.windows(2).all(|w| w[0].1 < w[1].1));
    assert!(bends[0].1 < 0);
    assert!(bends.last().unwrap().1 > 0);
}

#[test]
fn filter_delay_moves_notes_not_bends() {
    let mut config = Config::default();
    config.contour.lowpass = Some(LowPassCutoff::Hz2_0);
    let report = orchestrator(&config, glide(220))
        .run(&GenerateRequest::new(silent_audio(1.1), ""))
        .unwrap();

    let delay_ticks = (report.delay * 1000.0).round() as i64;
    assert_eq!(delay_ticks, 552);
    assert_eq!(report.sequence.notes()[0].begin_tick, 100 + delay_ticks);
}

#[test]
fn unknown_phone_aborts_generation() {
    let segments = vec![
        Segment::new(0.1, 0.15, "xx"),
        Segment::new(0.15, 0.3, "a"),
    ];
    let orchestrator = Orchestrator::new(
        Arc::new(MockVocoder::constant(220.0, 100)),
        Arc::new(LabelFileSegmenter::from_segments(segments)),
    );

    let err = orchestrator
        .run(&GenerateRequest::new(silent_audio(0.5), ""))
        .unwrap_err();
    match err {
        TalkseqError::Alignment { consonant, vowel } => {
            assert_eq!(consonant, "xx");
            assert_eq!(vowel, "a");
        }
        other => panic!("Expected Alignment error, got {other:?}"),
    }
}

#[test]
fn document_round_trip_through_writer() {
    let config = Config::default();
    let report = orchestrator(&config, glide(220))
        .run(&GenerateRequest::new(silent_audio(1.1), ""))
        .unwrap();

    let writer = VsqxWriter::new(find_singer("Miku(V2)").unwrap());
    let doc = writer.render(&report.sequence);

    assert_eq!(doc.matches("<note>").count(), 5);
    assert_eq!(doc.matches("<mCtrl>").count(), report.bend_points + 1);
    assert!(doc.contains("<phnms lock=\"1\"><![CDATA[tS i]]></phnms>"));
    assert!(doc.contains("<phnms lock=\"1\"><![CDATA[N\\]]></phnms>"));
    assert!(doc.contains("<vVoiceName><![CDATA[Miku(V2)]]></vVoiceName>"));
}

#[test]
fn split_consonant_emits_consonant_notes() {
    let mut config = Config::default();
    config.notes.split_consonant = true;
    let report = orchestrator(&config, glide(220))
        .run(&GenerateRequest::new(silent_audio(1.1), ""))
        .unwrap();

    assert!(report.sequence.notes().len() > 5);
    assert!(
        report
            .sequence
            .notes()
            .iter()
            .any(|n| n.phoneme.as_deref() == Some("k"))
    );
}
