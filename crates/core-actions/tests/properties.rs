mod common;
use common::*;

use core_actions::Engine;
use core_config::Config;
use core_events::{EngineEvent, EventLog};
use core_model::{Document, EditorModel};
use core_state::{Command, CommandFlags, HostAction, RangeShape};
use core_text::TextRange;
use proptest::prelude::*;
use std::sync::Arc;

fn insert_command(count: u32) -> Command {
    Command::host(HostAction::Named("insert".into())).with_count(count)
}

/// Run one insert session typing `text` under a command with `count`.
fn counted_session(text: &str, count: u32, flags: CommandFlags) -> (Engine, EditorModel) {
    let mut engine = Engine::default();
    let mut model = EditorModel::from_text("[]");
    model.set_cursor(1);
    engine.set_command(insert_command(count).with_flags(flags));
    engine.insert_before_cursor(&mut model).unwrap();
    type_str(&mut engine, &mut model, text);
    engine.end_session(&mut model).unwrap();
    (engine, model)
}

fn expected_after_removing(text: &str, spans: &[(usize, usize)]) -> String {
    text.chars()
        .enumerate()
        .filter(|(i, _)| !spans.iter().any(|&(s, e)| *i >= s && *i < e))
        .map(|(_, c)| c)
        .collect()
}

proptest! {
    // Out-of-range delete bounds behave exactly like their clamped form.
    #[test]
    fn delete_text_clamps_silently(text in "[a-c \n]{0,24}", start in 0usize..40, end in 0usize..40) {
        let len = text.chars().count();
        let mut raw_engine = Engine::default();
        let mut raw = EditorModel::from_text(&text);
        let mut clamped_engine = Engine::default();
        let mut clamped = EditorModel::from_text(&text);

        prop_assert!(raw_engine.delete_text(&mut raw, start, end, RangeShape::Exclusive).is_ok());
        prop_assert!(clamped_engine
            .delete_text(&mut clamped, start.min(len), end.min(len), RangeShape::Exclusive)
            .is_ok());
        prop_assert_eq!(raw.text(), clamped.text());
        prop_assert_eq!(
            raw_engine.registers().read('"').map(|r| r.text),
            clamped_engine.registers().read('"').map(|r| r.text)
        );
    }

    // Deleting segments back to front equals removing them all at once
    // from the original text.
    #[test]
    fn multi_segment_delete_matches_simultaneous_removal(
        text in "[a-z\n]{1,40}",
        cuts in proptest::collection::vec(0usize..41, 2..10),
    ) {
        let len = text.chars().count();
        let mut points: Vec<usize> = cuts.into_iter().map(|c| c.min(len)).collect();
        points.sort_unstable();
        points.dedup();
        let spans: Vec<(usize, usize)> = points.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        prop_assume!(!spans.is_empty());

        let mut engine = Engine::default();
        let mut model = EditorModel::from_text(&text);
        engine
            .delete_range(&mut model, &TextRange::from_spans(spans.clone()), RangeShape::Exclusive, true)
            .unwrap();
        prop_assert_eq!(model.text(), expected_after_removing(&text, &spans));
    }

    // A session opened with count k ends with the text typed k times.
    #[test]
    fn counted_session_equals_typing_k_times(text in "[a-z \n]{0,12}", k in 1u32..5) {
        let (_, replayed) = counted_session(&text, k, CommandFlags::empty());
        let (_, manual) = counted_session(&text.repeat(k as usize), 1, CommandFlags::empty());
        prop_assert_eq!(replayed.text(), manual.text());
        prop_assert_eq!(replayed.cursor(), manual.cursor());
    }

    // Replaying the recorded strokes k times into a fresh copy of the
    // starting buffer gives the same result as typing them k times.
    #[test]
    fn replaying_strokes_matches_manual_typing(text in "[a-z \n]{1,12}", k in 1u32..5) {
        let (engine, _) = counted_session(&text, 1, CommandFlags::empty());
        let strokes = engine.last_strokes().to_vec();

        let mut replay_engine = Engine::default();
        let mut replayed = EditorModel::from_text("[]").with_cursor(1);
        replay_engine.replay(&mut replayed, &strokes, k).unwrap();

        let mut typing_engine = Engine::default();
        let mut typed = EditorModel::from_text("[]").with_cursor(1);
        for _ in 0..k {
            type_str(&mut typing_engine, &mut typed, &text);
        }
        prop_assert_eq!(replayed.text(), typed.text());
    }

    // NO_REPEAT collapses any count to a single run.
    #[test]
    fn no_repeat_always_runs_once(text in "[a-z]{1,8}", k in 1u32..10) {
        let log = EventLog::new();
        let mut engine = Engine::builder(Config::default())
            .observer(Arc::new(log.clone()))
            .build();
        let mut model = EditorModel::from_text("");
        engine.set_command(insert_command(k).with_flags(CommandFlags::NO_REPEAT));
        engine.insert_before_cursor(&mut model).unwrap();
        type_str(&mut engine, &mut model, &text);
        engine.end_session(&mut model).unwrap();
        prop_assert_eq!(model.text(), text);
        let ended = log.take().into_iter().find_map(|e| match e {
            EngineEvent::SessionEnded { replays, .. } => Some(replays),
            _ => None,
        });
        prop_assert_eq!(ended, Some(0));
    }
}
