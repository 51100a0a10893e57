use super::*;

#[test]
fn empty_object_yields_defaults() {
    assert_eq!(CanvasConfig::from_json("{}").unwrap(), CanvasConfig::default());
}

#[test]
fn partial_override_keeps_other_defaults() {
    let config =
        CanvasConfig::from_json(r##"{"history_limit": 20, "background": "#eeeeee"}"##).unwrap();
    assert_eq!(config.history_limit, 20);
    assert_eq!(config.background, Rgba::opaque(0xee, 0xee, 0xee));
    assert_eq!(config.upload_debounce_ms, 400);
    assert_eq!(config.fill_tolerance, 5);
}

#[test]
fn bad_color_is_a_config_error() {
    let err = CanvasConfig::from_json(r#"{"brush_color": "blue"}"#).unwrap_err();
    assert!(matches!(err, CanvasError::Config(_)));
}

#[test]
fn fill_options_follow_config() {
    let config = CanvasConfig {
        fill_tolerance: 12,
        fill_expand_px: 2,
        ..CanvasConfig::default()
    };
    let options = config.fill_options(Rgba::BLACK);
    assert_eq!((options.tolerance, options.expand_px), (12, 2));
}
