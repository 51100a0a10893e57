use super::*;

fn entry(label: &str) -> HistoryEntry {
    HistoryEntry::new(SceneState::new(format!("{{\"label\":\"{label}\"}}")), label, 0)
}

fn timeline(limit: usize) -> HistoryTimeline {
    HistoryTimeline::new(entry(INITIAL_LABEL), limit)
}

fn labels(timeline: &HistoryTimeline) -> Vec<String> {
    timeline.entries().map(|e| e.label.clone()).collect()
}

#[test]
fn starts_with_single_entry_at_zero() {
    let timeline = timeline(10);
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline.current_index(), 0);
    assert!(!timeline.can_undo());
    assert!(!timeline.can_redo());
}

#[test]
fn undo_then_push_discards_redo_branch() {
    let mut timeline = timeline(10);
    timeline.push(entry("draw"));
    assert_eq!((timeline.len(), timeline.current_index()), (2, 1));

    assert_eq!(timeline.undo().map(|e| e.label.as_str()), Some(INITIAL_LABEL));
    assert_eq!(timeline.current_index(), 0);

    timeline.push(entry("draw2"));
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline.current_index(), 1);
    assert_eq!(timeline.current().label, "draw2");

    assert!(timeline.redo().is_none());
    assert_eq!(timeline.current_index(), 1);
}

#[test]
fn redo_is_always_a_no_op_after_push() {
    let mut timeline = timeline(10);
    for round in 0..4 {
        timeline.push(entry(&format!("a{round}")));
        timeline.push(entry(&format!("b{round}")));
        for _ in 0..round {
            timeline.undo();
        }
        timeline.push(entry(&format!("c{round}")));
        assert!(!timeline.can_redo());
        assert_eq!(timeline.current_index(), timeline.len() - 1);
    }
}

#[test]
fn cap_evicts_oldest_and_saturates_cursor() {
    let limit = 100;
    let mut timeline = timeline(limit);
    for n in 0..limit + 5 {
        timeline.push(entry(&format!("step{n}")));
    }
    assert_eq!(timeline.len(), limit);
    assert_eq!(timeline.current_index(), limit - 1);
    // initial + step0..step104 = 106 pushed entries; the oldest 6 were evicted.
    assert_eq!(timeline.get(0).unwrap().label, "step5");
    assert_eq!(timeline.current().label, format!("step{}", limit + 4));
}

#[test]
fn push_after_undo_at_cap_keeps_cursor_bounded() {
    let mut timeline = timeline(3);
    timeline.push(entry("a"));
    timeline.push(entry("b"));
    timeline.undo();
    timeline.push(entry("c"));
    assert_eq!(labels(&timeline), vec![INITIAL_LABEL, "a", "c"]);
    assert_eq!(timeline.current_index(), 2);
    timeline.push(entry("d"));
    assert_eq!(labels(&timeline), vec!["a", "c", "d"]);
    assert_eq!(timeline.current_index(), 2);
}

#[test]
fn jump_preserves_redo_branch_until_next_push() {
    let mut timeline = timeline(10);
    timeline.push(entry("a"));
    timeline.push(entry("b"));
    timeline.push(entry("c"));

    assert_eq!(timeline.jump(1).map(|e| e.label.as_str()), Some("a"));
    assert_eq!(timeline.len(), 4);
    assert!(timeline.can_redo());

    assert_eq!(timeline.jump(3).map(|e| e.label.as_str()), Some("c"));
    timeline.jump(1);
    timeline.push(entry("d"));
    assert_eq!(labels(&timeline), vec![INITIAL_LABEL, "a", "d"]);
}

#[test]
fn jump_out_of_range_is_ignored() {
    let mut timeline = timeline(10);
    timeline.push(entry("a"));
    assert!(timeline.jump(2).is_none());
    assert_eq!(timeline.current_index(), 1);
}

#[test]
fn reset_leaves_single_entry() {
    let mut timeline = timeline(10);
    timeline.push(entry("a"));
    timeline.push(entry("b"));
    timeline.reset(entry(INITIAL_LABEL));
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline.current_index(), 0);
}

#[test]
fn items_are_newest_first_with_positions() {
    let mut timeline = timeline(10);
    timeline.push(entry("a"));
    timeline.push(entry("b"));
    timeline.undo();
    let items = timeline.items();
    let summary: Vec<_> = items.iter().map(|i| (i.index, i.label, i.position)).collect();
    assert_eq!(
        summary,
        vec![
            (2, "b", HistoryPosition::Future),
            (1, "a", HistoryPosition::Current),
            (0, INITIAL_LABEL, HistoryPosition::Past),
        ]
    );
}

#[test]
fn zero_limit_is_treated_as_one() {
    let mut timeline = timeline(0);
    timeline.push(entry("a"));
    assert_eq!(labels(&timeline), vec!["a"]);
    assert_eq!(timeline.current_index(), 0);
}
