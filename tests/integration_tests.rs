use dmtx_rs::encode::Scheme;
use dmtx_rs::symbol::SizeRequest;
use dmtx_rs::{decode, encode, DecodeProperties, EncodeProperties, RoiBox, SchemeRequest};

/// Spec §8.7 scenario 1: ASCII auto-sized round trip.
#[test]
fn ascii_auto_size_round_trip() {
    let props = EncodeProperties::new().module_size(4).margin_size(2);
    let img = encode(b"30Q324343430794<OQQ", &props).unwrap();

    let decoded = decode(&img, &DecodeProperties::new()).unwrap();
    assert_eq!(decoded.data, b"30Q324343430794<OQQ");
}

/// Spec §8.7 scenario 2: a forced-C40 message round trips byte for byte.
#[test]
fn c40_forced_round_trip() {
    let props = EncodeProperties::new()
        .scheme(SchemeRequest::Fixed(Scheme::C40))
        .module_size(4)
        .margin_size(2);
    let img = encode(b"ABCDEF123456", &props).unwrap();

    let decoded = decode(&img, &DecodeProperties::new()).unwrap();
    assert_eq!(decoded.data, b"ABCDEF123456");
}

/// Spec §4.1 end-of-data case 2: a forced-C40 message whose value count is
/// one short of a full triplet (7 single-value letters) must unlatch to
/// ASCII for the trailing character rather than pad it into a triplet.
#[test]
fn c40_forced_round_trip_one_value_short_of_a_triplet() {
    let props = EncodeProperties::new()
        .scheme(SchemeRequest::Fixed(Scheme::C40))
        .module_size(4)
        .margin_size(2);
    let img = encode(b"ABCDEFG", &props).unwrap();

    let decoded = decode(&img, &DecodeProperties::new()).unwrap();
    assert_eq!(decoded.data, b"ABCDEFG");
}

/// Spec §4.1 end-of-data case 2: a forced-C40 message whose value count is
/// two short of a full triplet (8 single-value letters).
#[test]
fn c40_forced_round_trip_two_values_short_of_a_triplet() {
    let props = EncodeProperties::new()
        .scheme(SchemeRequest::Fixed(Scheme::C40))
        .module_size(4)
        .margin_size(2);
    let img = encode(b"ABCDEFGH", &props).unwrap();

    let decoded = decode(&img, &DecodeProperties::new()).unwrap();
    assert_eq!(decoded.data, b"ABCDEFGH");
}

/// Spec §8.7 scenario 3: Base-256 carries an arbitrary byte payload,
/// including bytes that aren't valid ASCII/C40/text/X12/EDIFACT values.
#[test]
fn base256_forced_round_trip_arbitrary_bytes() {
    let payload: Vec<u8> = (0..10).map(|i| (i * 37 + 5) as u8).collect();
    let props = EncodeProperties::new()
        .scheme(SchemeRequest::Fixed(Scheme::Base256))
        .module_size(4)
        .margin_size(2);
    let img = encode(&payload, &props).unwrap();

    let decoded = decode(&img, &DecodeProperties::new()).unwrap();
    assert_eq!(decoded.data, payload);
}

/// The optimiser's own choice of scheme round trips too, not just each
/// scheme forced individually.
#[test]
fn optimizer_auto_scheme_round_trip_mixed_content() {
    let props = EncodeProperties::new().module_size(4).margin_size(2);
    let img = encode(b"Track42: ABC-99, qty=17!", &props).unwrap();

    let decoded = decode(&img, &DecodeProperties::new()).unwrap();
    assert_eq!(decoded.data, b"Track42: ABC-99, qty=17!");
}

/// Spec §4.1's EDIFACT completion table round trips under a forced scheme.
#[test]
fn edifact_forced_round_trip() {
    let props = EncodeProperties::new()
        .scheme(SchemeRequest::Fixed(Scheme::Edifact))
        .size_request(SizeRequest::AutoAny)
        .module_size(4)
        .margin_size(2);
    let img = encode(b"EDIFACT TEST 123", &props).unwrap();

    let decoded = decode(&img, &DecodeProperties::new()).unwrap();
    assert_eq!(decoded.data, b"EDIFACT TEST 123");
}

/// A region of interest that excludes the symbol entirely must fail closed,
/// while the unrestricted decode on the same image still finds it (spec §6.4).
#[test]
fn roi_outside_symbol_fails_closed() {
    let props = EncodeProperties::new().module_size(4).margin_size(2);
    let img = encode(b"HELLO", &props).unwrap();

    let mut canvas = image::GrayImage::from_pixel(img.width() * 3, img.height() * 3, image::Luma([255u8]));
    image::imageops::overlay(&mut canvas, &img, img.width(), img.height());

    let roi = RoiBox {
        x_min: Some(0),
        x_max: Some(img.width() - 1),
        y_min: Some(0),
        y_max: Some(img.height() - 1),
    };
    assert!(decode(&canvas, &DecodeProperties::new().roi(roi)).is_err());
    assert_eq!(decode(&canvas, &DecodeProperties::new()).unwrap().data, b"HELLO");
}

/// A pinned expected size that doesn't match the encoded symbol must fail
/// rather than silently decoding at the wrong size.
#[test]
fn mismatched_expected_size_fails() {
    let props = EncodeProperties::new()
        .size_request(SizeRequest::Specific(0))
        .module_size(4)
        .margin_size(2);
    let img = encode(b"A", &props).unwrap();

    let wrong_size = DecodeProperties::new().size_idx_expected(20);
    assert!(decode(&img, &wrong_size).is_err());

    let right_size = DecodeProperties::new().size_idx_expected(0);
    assert_eq!(decode(&img, &right_size).unwrap().data, b"A");
}
