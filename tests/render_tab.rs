//! Rendering tests — track data to text tablature, checked byte for byte.

use pretty_assertions::assert_eq;
use tabriff::note_time::simplify;
use tabriff::{join_tabs, render_tab, Bar, Note, NoteModifier, NoteTime, TabData, TimeSignature, TrackData};

fn t(numerator: i64, denominator: i64) -> NoteTime {
    NoteTime::new(numerator, denominator).unwrap()
}

fn note(start: NoteTime, duration: (i64, i64), string: usize, fret: u32) -> Note {
    Note::new(start, t(duration.0, duration.1), string, fret)
}

fn bar(time_signature: Option<(u32, u32)>, notes: Vec<Note>) -> Bar {
    Bar {
        time_signature: time_signature.map(|(n, d)| TimeSignature::new(n, d).unwrap()),
        notes,
    }
}

fn track(strings: &[&str], bars: Vec<Bar>) -> TrackData {
    TrackData {
        name: "Test".into(),
        string_names: strings.iter().map(|s| s.to_string()).collect(),
        bars,
    }
}

const GUITAR: [&str; 6] = ["E", "B", "G", "D", "A", "E"];
const BASS: [&str; 4] = ["G", "D", "A", "E"];

fn rows(rows: &[&str]) -> String {
    rows.join("\n")
}

fn render(track: &TrackData) -> TabData {
    render_tab(track).expect("track should render")
}

#[test]
fn renders_tuning_time_signature_and_bar() {
    let track = track(
        &GUITAR,
        vec![bar(
            Some((4, 4)),
            vec![
                note(t(0, 1), (1, 4), 5, 0),
                note(t(0, 1), (1, 4), 4, 2),
                note(t(0, 1), (1, 4), 3, 2),
                note(t(1, 4), (3, 8), 2, 0),
                note(t(5, 8), (1, 8), 1, 2),
                note(t(7, 8), (1, 8), 0, 2),
            ],
        )],
    );

    let tab = render(&track);
    assert_eq!(tab.tuning, rows(&["E|", "B|", "G|", "D|", "A|", "E|"]));
    assert_eq!(
        tab.time_signatures.get(&0).map(String::as_str),
        Some(rows(&[" :", " :", "4:", "4:", " :", " :"]).as_str())
    );
    assert_eq!(
        tab.bars[0],
        rows(&["-------2|", "-----2--|", "--0~~---|", "2~------|", "2~------|", "0~------|"])
    );
}

#[test]
fn right_aligns_tuning_with_accidentals() {
    let track = track(&["E", "B", "G", "D", "A", "C#"], vec![bar(Some((4, 4)), vec![])]);
    assert_eq!(
        render(&track).tuning,
        rows(&[" E|", " B|", " G|", " D|", " A|", "C#|"])
    );
}

#[test]
fn double_digit_time_signature_on_five_strings() {
    let track = track(&["G", "D", "A", "E", "B"], vec![bar(Some((3, 16)), vec![])]);
    let tab = render(&track);
    assert_eq!(
        tab.time_signatures[&0],
        rows(&["  :", " 3:", "16:", "  :", "  :"])
    );
}

#[test]
fn time_signature_on_one_string() {
    let track = track(&["E"], vec![bar(Some((3, 16)), vec![])]);
    assert_eq!(render(&track).time_signatures[&0], "3/16:");
}

#[test]
fn empty_bar() {
    let track = track(&["E"], vec![bar(Some((3, 16)), vec![])]);
    assert_eq!(join_tabs(&render(&track).bars), "-|");
}

#[test]
fn later_bars_only_get_headers_when_they_change() {
    let track = track(
        &["E"],
        vec![bar(Some((4, 4)), vec![]), bar(None, vec![]), bar(Some((3, 4)), vec![])],
    );
    let tab = render(&track);
    assert_eq!(tab.time_signatures.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(tab.time_signatures[&2], "3/4:");
}

#[test]
fn redeclaring_the_active_signature_adds_no_header() {
    let track = track(
        &["E"],
        vec![bar(Some((4, 4)), vec![]), bar(None, vec![]), bar(Some((4, 4)), vec![])],
    );
    let tab = render(&track);
    assert_eq!(tab.time_signatures.keys().copied().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn note_modifiers() {
    let track = track(
        &GUITAR,
        vec![
            bar(
                Some((4, 4)),
                vec![
                    note(t(0, 1), (1, 4), 5, 0).with_modifier(NoteModifier::Staccato),
                    note(t(0, 1), (1, 4), 4, 2).with_modifier(NoteModifier::Staccato),
                    note(t(0, 1), (1, 4), 3, 2).with_modifier(NoteModifier::Staccato),
                    note(t(1, 4), (1, 8), 2, 0),
                    note(t(3, 8), (1, 4), 2, 2).with_modifier(NoteModifier::HammerOn),
                    note(t(5, 8), (1, 8), 0, 2),
                    note(t(3, 4), (1, 8), 0, 7).with_modifier(NoteModifier::SlideUp),
                    note(t(7, 8), (1, 8), 0, 2).with_modifier(NoteModifier::SlideDown),
                ],
            ),
            bar(
                None,
                vec![
                    note(t(0, 1), (1, 4), 0, 2).with_modifier(NoteModifier::Tie),
                    note(t(1, 4), (1, 8), 0, 2).with_modifier(NoteModifier::Tie),
                    note(t(1, 2), (3, 8), 2, 4),
                    note(t(7, 8), (1, 8), 2, 0).with_modifier(NoteModifier::Dead),
                ],
            ),
        ],
    );

    let expected = rows(&[
        "      /\\          ",
        "-----272|~~~-----|",
        "---h----|--------|",
        ".-02~---|----4~~×|",
        "2~------|--------|",
        "2~------|--------|",
        "0~------|--------|",
    ]);
    assert_eq!(join_tabs(&render(&track).bars), expected);
}

#[test]
fn double_digit_frets() {
    let track = track(
        &GUITAR,
        vec![
            bar(Some((4, 4)), vec![note(t(0, 1), (4, 4), 0, 14)]),
            bar(
                None,
                vec![
                    note(t(0, 1), (1, 4), 5, 0).with_modifier(NoteModifier::Staccato),
                    note(t(0, 1), (1, 4), 4, 12).with_modifier(NoteModifier::Staccato),
                    note(t(0, 1), (1, 4), 3, 12).with_modifier(NoteModifier::Staccato),
                    note(t(1, 4), (1, 8), 2, 0),
                    note(t(3, 8), (1, 4), 2, 12).with_modifier(NoteModifier::HammerOn),
                    note(t(5, 8), (1, 8), 0, 12),
                    note(t(3, 4), (1, 8), 0, 17).with_modifier(NoteModifier::SlideUp),
                    note(t(7, 8), (1, 8), 0, 12).with_modifier(NoteModifier::SlideDown),
                ],
            ),
            bar(
                None,
                vec![
                    note(t(0, 1), (1, 4), 0, 12).with_modifier(NoteModifier::Tie),
                    note(t(1, 4), (1, 8), 0, 12).with_modifier(NoteModifier::Tie),
                    note(t(1, 2), (1, 8), 2, 9),
                    note(t(1, 2), (1, 8), 4, 8),
                    note(t(5, 8), (1, 8), 2, 10),
                    note(t(5, 8), (1, 8), 4, 9),
                    note(t(3, 4), (1, 4), 2, 12),
                    note(t(3, 4), (1, 4), 4, 10),
                ],
            ),
        ],
    );

    let expected = rows(&[
        "⌐¬           ⌐¬/¬⌐\\            ",
        "14~~~|-------121712|~~~-------|",
        "-----|----h¬-------|-----⌐¬⌐¬-|",
        "-----|⌐.-012~------|----91012~|",
        "-----|12~----------|-------⌐¬-|",
        "-----|12~----------|----8-910~|",
        "-----|-0~----------|----------|",
    ]);
    assert_eq!(join_tabs(&render(&track).bars), expected);
}

#[test]
fn tuplets() {
    let track = track(
        &["E"],
        vec![
            // quaver triplets: a quaver is 1.5 grid ticks
            bar(
                Some((4, 4)),
                vec![
                    note(t(0, 1), (1, 12), 0, 1),
                    note(t(1, 12), (1, 12), 0, 2),
                    note(t(1, 6), (1, 12), 0, 3),
                    note(t(1, 4), (1, 8), 0, 4),
                    note(t(3, 8), (1, 8), 0, 5),
                    note(t(1, 2), (1, 2), 0, 6),
                ],
            ),
            // crotchet quintuplets: a quaver is 1.25 grid ticks
            bar(
                None,
                vec![
                    note(t(0, 1), (1, 10), 0, 1),
                    note(t(1, 10), (1, 10), 0, 2),
                    note(t(1, 5), (1, 10), 0, 3),
                    note(t(3, 10), (1, 10), 0, 4),
                    note(t(2, 5), (1, 10), 0, 5),
                    note(t(1, 2), (1, 8), 0, 6),
                    note(t(5, 8), (1, 8), 0, 7),
                    note(t(3, 4), (1, 4), 0, 8),
                ],
            ),
            // triplets and quintuplets in the same bar
            bar(
                None,
                vec![
                    note(t(0, 1), (1, 12), 0, 1),
                    note(t(1, 12), (1, 12), 0, 2),
                    note(t(1, 6), (1, 12), 0, 3),
                    note(t(1, 4), (1, 8), 0, 4),
                    note(t(3, 8), (1, 8), 0, 5),
                    note(t(1, 2), (1, 10), 0, 1),
                    note(t(3, 5), (1, 10), 0, 2),
                    note(t(7, 10), (1, 10), 0, 3),
                    note(t(4, 5), (1, 10), 0, 4),
                    note(t(9, 10), (1, 10), 0, 5),
                ],
            ),
        ],
    );

    assert_eq!(
        render(&track).bars,
        vec![
            "1~2~3~4~~5~~6~~~~~~~~~~~|".to_string(),
            "1~~~2~~~3~~~4~~~5~~~6~~~~7~~~~8~~~~~~~~~|".to_string(),
            "1~~~~~~~~~2~~~~~~~~~3~~~~~~~~~4~~~~~~~~~~~~~~5~~~~~~~~~~~~~~1~~~~~~~~~~~2~~~~~~~~~~~3~~~~~~~~~~~4~~~~~~~~~~~5~~~~~~~~~~~|".to_string(),
        ]
    );
}

#[test]
fn tuplets_in_compound_time() {
    let track = track(
        &BASS,
        vec![bar(
            Some((6, 8)),
            vec![
                note(t(0, 1), (1, 8), 3, 0).with_modifier(NoteModifier::Staccato),
                note(t(1, 8), (1, 8), 3, 0).with_modifier(NoteModifier::Staccato),
                note(t(1, 4), (1, 16), 3, 0),
                note(t(5, 16), (1, 16), 2, 7),
                // semiquaver triplets
                note(t(3, 8), (1, 24), 1, 5),
                note(t(5, 12), (1, 24), 1, 6).with_modifier(NoteModifier::HammerOn),
                note(t(11, 24), (1, 24), 1, 5).with_modifier(NoteModifier::PullOff),
                note(t(1, 2), (1, 16), 2, 7),
                note(t(9, 16), (1, 16), 3, 7),
                note(t(5, 8), (1, 16), 3, 8),
                note(t(11, 16), (1, 16), 3, 5),
            ],
        )],
    );

    assert_eq!(
        render(&track).bars[0],
        rows(&[
            "--------------------h-p-------------|",
            "------------------5~6~5~------------|",
            ".-----.--------7~~------7~~---------|",
            "0~~~~~0~~~~~0~~------------7~~8~~5~~|",
        ])
    );
}

fn quavers(string: usize, frets: &[u32]) -> Vec<Note> {
    frets
        .iter()
        .enumerate()
        .map(|(i, &fret)| note(simplify(t(i as i64, 8)), (1, 8), string, fret))
        .collect()
}

#[test]
fn repeating_quavers() {
    let mut bars = Vec::new();

    let mut first = quavers(1, &[5; 8]);
    first.extend(quavers(2, &[3; 8]));
    bars.push(bar(
        Some((4, 4)),
        first.into_iter().map(|n| n.with_modifier(NoteModifier::Staccato)).collect(),
    ));

    let mut second = quavers(1, &[5; 8]);
    second.extend(quavers(2, &[3; 4]));
    bars.push(bar(None, second));

    let mut third = quavers(1, &[0, 1, 0, 1, 0, 1, 0, 1]);
    third.extend(quavers(2, &[0; 8]));
    bars.push(bar(None, third));

    bars.push(bar(None, quavers(2, &[3, 3, 3, 3, 5, 3, 5, 3])));

    let mut staccato_tail = quavers(2, &[3; 8]);
    for n in staccato_tail.iter_mut().skip(4) {
        n.modifier = Some(NoteModifier::Staccato);
    }
    bars.push(bar(None, staccato_tail));

    bars.push(bar(None, quavers(2, &[3, 3, 3, 5, 5, 5, 5, 5])));
    bars.push(bar(None, quavers(2, &[3, 3, 5, 5, 5, 5, 3, 3])));

    // an unsimplified start time lands on the same grid
    let mut mixed = vec![note(t(0, 8), (1, 8), 2, 3)];
    mixed.extend(quavers(2, &[3, 5, 5, 5, 5, 5, 5]).into_iter().skip(1));
    mixed.push(note(t(7, 8), (1, 8), 2, 3));
    bars.push(bar(None, mixed));

    // crotchets are written out in full
    bars.push(bar(
        None,
        (0..4).map(|i| note(simplify(t(i, 4)), (1, 4), 2, 3)).collect(),
    ));

    // repeated dotted crotchets are written out
    bars.push(bar(
        None,
        vec![
            note(t(0, 1), (1, 8), 2, 3),
            note(t(1, 8), (1, 8), 2, 3),
            note(t(1, 4), (3, 8), 2, 3),
            note(t(5, 8), (3, 8), 2, 3),
        ],
    ));

    let mut high = quavers(1, &[15; 4]);
    high.extend(
        (4..6).map(|i| note(simplify(t(i, 8)), (1, 8), 0, 17)),
    );
    bars.push(bar(None, high));

    bars.push(bar(Some((2, 4)), quavers(2, &[3, 4, 4, 3])));

    let expected = rows(&[
        "                                                                ⌐¬         ",
        ".-|----|--------|------|----|-----|------|----|----|--------|⌐¬-17’--|----|",
        "5”|5”5”|01010101|------|--.-|-----|------|----|----|--------|15”-----|----|",
        "3”|3”--|00000000|3”5353|3”3”|3’’5”|3’5”3’|35”3|3333|3’3~~3~~|--------|34’3|",
        "--|----|--------|------|----|-----|------|----|----|--------|--------|----|",
    ]);
    assert_eq!(join_tabs(&render(&track(&BASS, bars)).bars), expected);
}
