use super::*;

#[test]
fn parses_long_and_short_hex() {
    assert_eq!(Rgba::from_hex("#1f1f1f").unwrap(), Rgba::opaque(0x1f, 0x1f, 0x1f));
    assert_eq!(Rgba::from_hex("#fff").unwrap(), Rgba::WHITE);
    assert_eq!(Rgba::from_hex("00ff0080").unwrap(), Rgba::new(0, 255, 0, 128));
}

#[test]
fn rejects_malformed_hex() {
    assert!(Rgba::from_hex("").is_err());
    assert!(Rgba::from_hex("#12345").is_err());
    assert!(Rgba::from_hex("#gggggg").is_err());
    assert!(Rgba::from_hex("#ééé").is_err());
}

#[test]
fn hex_output_drops_opaque_alpha() {
    assert_eq!(Rgba::opaque(255, 0, 16).to_hex(), "#ff0010");
    assert_eq!(Rgba::new(255, 0, 16, 0).to_hex(), "#ff001000");
}

#[test]
fn rgb_tolerance_ignores_alpha() {
    let seed = Rgba::new(100, 100, 100, 0);
    assert!(seed.rgb_within(Rgba::opaque(105, 95, 100), 5));
    assert!(!seed.rgb_within(Rgba::opaque(106, 100, 100), 5));
    assert!(seed.rgb_within(Rgba::opaque(100, 100, 100), 0));
}

#[test]
fn serializes_as_hex_string() {
    let json = serde_json::to_string(&Rgba::opaque(1, 2, 3)).unwrap();
    assert_eq!(json, "\"#010203\"");
    let parsed: Rgba = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, Rgba::opaque(1, 2, 3));
}
