use boucle_midi::layout::{self, coord_for, note_for};
use boucle_midi::{PadMessage, PadProtocol};
use boucle_session::{Clip, ClipState, LoopEngine, Song, SongCommand};
use crossbeam_channel::Receiver;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn full_song(width: usize, height: usize) -> (Song, Receiver<SongCommand>) {
    let (mut song, rx) = Song::new(width, height);
    for x in 0..width {
        for y in 0..height {
            song.add_clip(Clip::new(format!("{x}:{y}"), x, y, 48_000)).unwrap();
        }
    }
    (song, rx)
}

#[test]
fn coordinate_mapping_roundtrips_over_the_pad_region() {
    for x in 0..4 {
        for y in 0..4 {
            let note = note_for(x, y).unwrap();
            assert_eq!(coord_for(note), Some((x, y)));
        }
    }
}

proptest! {
    #[test]
    fn every_mapped_note_leads_back_to_itself(note in any::<u8>()) {
        if let Some((x, y)) = coord_for(note) {
            prop_assert_eq!(note_for(x, y), Some(note));
        }
    }

    #[test]
    fn malformed_frames_never_toggle(bytes in proptest::collection::vec(any::<u8>(), 0..12)) {
        prop_assume!(bytes.len() != 3);
        let (song, rx) = full_song(4, 4);
        let pad = PadProtocol::default();
        prop_assert_eq!(pad.process_note(&song, [bytes]), 0);
        prop_assert!(rx.try_recv().is_err());
    }
}

#[test]
fn second_update_without_changes_is_empty() {
    let (song, _rx) = full_song(4, 4);
    let mut pad = PadProtocol::default();
    assert_eq!(pad.update_pad(&song).len(), 16);
    assert!(pad.update_pad(&song).is_empty());
}

#[test]
fn one_state_change_emits_one_message() {
    let (song, _rx) = full_song(4, 4);
    let mut pad = PadProtocol::default();
    pad.update_pad(&song);

    song.clip_at(1, 2).unwrap().set_state(ClipState::Starting);
    let messages = pad.update_pad(&song);
    assert_eq!(messages, vec![PadMessage::note_on(52, 13)]);
    assert_eq!(messages[0].to_bytes(0), [0x90, 52, 13]);
}

#[test]
fn larger_song_only_addresses_the_pad_region() {
    let (song, _rx) = full_song(8, 8);
    let mut pad = PadProtocol::default();
    let messages = pad.update_pad(&song);
    assert_eq!(messages.len(), 16);
    let expected: Vec<_> = layout::pads()
        .map(|(_, _, note)| PadMessage::note_on(note, 12))
        .collect();
    assert_eq!(messages, expected);

    song.clip_at(6, 7).unwrap().set_state(ClipState::Start);
    assert!(pad.update_pad(&song).is_empty());
}

#[test]
fn note_off_toggles_once_and_note_on_does_nothing() {
    let (song, rx) = full_song(4, 4);
    let pad = PadProtocol::default();

    assert_eq!(pad.process_note(&song, [[0x90, 41, 100]]), 0);
    assert!(rx.try_recv().is_err());

    assert_eq!(pad.process_note(&song, [[0x80, 41, 0]]), 1);
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![SongCommand::Toggle { x: 0, y: 3 }]
    );
}

#[test]
fn short_long_and_unmapped_frames_are_ignored() {
    let (song, rx) = full_song(4, 4);
    let pad = PadProtocol::default();
    let frames: Vec<Vec<u8>> = vec![vec![0x80, 36], vec![0x80, 36, 0, 0], vec![0x80, 37, 0]];
    assert_eq!(pad.process_note(&song, &frames), 0);
    assert!(rx.try_recv().is_err());
}

#[test]
fn pad_press_round_trip_through_the_engine() {
    let (song, rx) = full_song(4, 4);
    let mut engine = LoopEngine::new(rx, 1_000);
    let mut pad = PadProtocol::default();
    pad.update_pad(&song);

    pad.process_note(&song, [[0x80, 60, 0]]);
    engine.process_commands(&song);
    assert_eq!(pad.update_pad(&song), vec![PadMessage::note_on(60, 13)]);

    engine.advance(&song, 1_000);
    assert_eq!(pad.update_pad(&song), vec![PadMessage::note_on(60, 14)]);
}
