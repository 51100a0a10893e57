use super::*;

fn mask_with(width: u32, height: u32, points: &[(u32, u32)]) -> FillMask {
    let mut mask = FillMask::empty(width, height);
    for (x, y) in points {
        mask.set(*x, *y);
    }
    mask
}

#[test]
fn from_rgba_checks_length() {
    let err = PixelBuffer::from_rgba(2, 2, vec![0; 15]).unwrap_err();
    assert!(matches!(err, CanvasError::BufferSize { expected: 16, actual: 15, .. }));
    assert!(PixelBuffer::from_rgba(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn put_and_get_address_row_major() {
    let mut buffer = PixelBuffer::new(3, 2, Rgba::WHITE);
    buffer.put(2, 1, Rgba::BLACK);
    assert_eq!(buffer.get(2, 1), Rgba::BLACK);
    assert_eq!(buffer.as_raw()[(1 * 3 + 2) * 4..(1 * 3 + 2) * 4 + 4], [0, 0, 0, 255]);
    assert_eq!(buffer.count_color(Rgba::WHITE), 5);
}

#[test]
fn contains_rejects_negative_and_edge_coordinates() {
    let buffer = PixelBuffer::new(4, 3, Rgba::WHITE);
    assert!(buffer.contains(0, 0));
    assert!(buffer.contains(3, 2));
    assert!(!buffer.contains(-1, 0));
    assert!(!buffer.contains(4, 0));
    assert!(!buffer.contains(0, 3));
}

#[test]
fn blend_half_transparent_over_white() {
    let mut buffer = PixelBuffer::new(1, 1, Rgba::WHITE);
    buffer.blend(0, 0, Rgba::new(0, 0, 0, 128));
    let px = buffer.get(0, 0);
    assert_eq!(px.a, 255);
    assert!(px.r > 120 && px.r < 135);
}

#[test]
fn dilate_grows_single_pixel_into_plus() {
    let mask = mask_with(5, 5, &[(2, 2)]);
    let grown = mask.dilate();
    assert_eq!(grown.count(), 5);
    for (x, y) in [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)] {
        assert!(grown.is_set(x, y));
    }
    assert!(!grown.is_set(1, 1));
}

#[test]
fn dilate_reaches_border_pixels() {
    let mask = mask_with(3, 3, &[(0, 1)]);
    let grown = mask.dilate();
    assert!(grown.is_set(0, 0));
    assert!(grown.is_set(0, 2));
    assert!(grown.is_set(1, 1));
}

#[test]
fn dilating_twice_is_superset_of_once() {
    let mask = mask_with(7, 6, &[(1, 1), (5, 4)]);
    let once = mask.dilate();
    let twice = once.dilate();
    assert!(once.is_superset_of(&mask));
    assert!(twice.is_superset_of(&once));
    assert_eq!(mask.dilate_by(2), twice);
}

#[test]
fn dilating_full_mask_is_identity() {
    let full = FillMask::from_color(&PixelBuffer::new(4, 4, Rgba::BLACK), Rgba::BLACK);
    assert_eq!(full.count(), 16);
    assert_eq!(full.dilate(), full);
}

#[test]
fn mask_requires_full_alpha() {
    let mut buffer = PixelBuffer::new(2, 1, Rgba::BLACK);
    buffer.put(1, 0, Rgba::new(0, 0, 0, 200));
    let mask = FillMask::from_color(&buffer, Rgba::BLACK);
    assert!(mask.is_set(0, 0));
    assert!(!mask.is_set(1, 0));
}

#[test]
fn png_round_trip_preserves_pixels() {
    let mut buffer = PixelBuffer::new(4, 3, Rgba::WHITE);
    buffer.put(1, 2, Rgba::new(10, 20, 30, 40));
    let encoded = buffer.encode_png().unwrap();
    assert_eq!(encoded.format, ImageFormat::Png);
    assert_eq!(PixelBuffer::decode(&encoded).unwrap(), buffer);
}

#[test]
fn data_url_round_trip() {
    let encoded = PixelBuffer::new(2, 2, Rgba::BLACK).encode_png().unwrap();
    let url = encoded.to_data_url();
    assert!(url.starts_with("data:image/png;base64,"));
    assert_eq!(EncodedImage::from_data_url(&url).unwrap(), encoded);
}

#[test]
fn data_url_rejects_unknown_payloads() {
    assert!(EncodedImage::from_data_url("hello").is_err());
    assert!(EncodedImage::from_data_url("data:image/gif;base64,AAAA").is_err());
    assert!(EncodedImage::from_data_url("data:image/png,AAAA").is_err());
    assert!(EncodedImage::from_data_url("data:image/png;base64,@@@").is_err());
}

#[test]
fn jpeg_encode_produces_decodable_image() {
    let encoded = PixelBuffer::new(8, 8, Rgba::WHITE).encode(ImageFormat::Jpeg).unwrap();
    let decoded = PixelBuffer::decode(&encoded).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 8));
}
