use super::*;

const RED: Rgba = Rgba::opaque(255, 0, 0);

fn tools() -> ToolState {
    ToolState::new(RED, Rgba::WHITE, 6.0)
}

#[test]
fn starts_in_brush_mode() {
    let state = tools();
    assert_eq!(state.mode(), ToolMode::Brush);
    assert_eq!(state.stroke_color(), RED);
}

#[test]
fn eraser_paints_with_background() {
    let mut state = tools();
    state.set_mode(ToolMode::Eraser);
    assert_eq!(state.stroke_color(), Rgba::WHITE);
    assert!(state.mode().draws());
    assert_eq!(state.brush_color(), RED);
}

#[test]
fn fill_mode_disables_drawing() {
    let mut state = tools();
    state.set_mode(ToolMode::Fill);
    assert!(!state.mode().draws());
    assert_eq!(state.stroke_color(), RED);
}

#[test]
fn selecting_color_exits_special_modes() {
    for mode in [ToolMode::Eraser, ToolMode::Fill] {
        let mut state = tools();
        state.set_mode(mode);
        state.select_color(Rgba::BLACK);
        assert_eq!(state.mode(), ToolMode::Brush);
        assert_eq!(state.stroke_color(), Rgba::BLACK);
    }
}

#[test]
fn toggle_returns_to_brush() {
    let mut state = tools();
    assert_eq!(state.toggle(ToolMode::Eraser), ToolMode::Eraser);
    assert_eq!(state.toggle(ToolMode::Fill), ToolMode::Fill);
    assert_eq!(state.toggle(ToolMode::Fill), ToolMode::Brush);
}

#[test]
fn width_is_clamped() {
    assert_eq!(sanitize_width(0.2), 1.0);
    assert_eq!(sanitize_width(400.0), 60.0);
    assert_eq!(sanitize_width(f32::NAN), DEFAULT_BRUSH_WIDTH);
    let mut state = tools();
    state.set_width(12.0);
    assert_eq!(state.brush_width(), 12.0);
}
