use std::{fs, path::Path, process::Command};

use pgm2png::{
    convert, convert_with, decode_file, BitDepth, ConvertError, EncodeOptions, FilterStrategy,
    Image, ImageFormat, Interlacing, PgmEncoding, PGM, PNG,
};

const GRADIENT: &[u8] = include_bytes!("gradient.pgm");
const DEEP: &[u8] = include_bytes!("deep.pgm");
const PLAIN: &[u8] = include_bytes!("plain.pgm");

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// A 512x512 8-bit image shaped like a blurred photo: smooth with mild noise.
fn lena_sized_pgm() -> Vec<u8> {
    let mut bytes = b"P5\n512 512\n255\n".to_vec();
    let mut state = 0x2545f491u32;
    for y in 0..512u32 {
        for x in 0..512u32 {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let base = ((x * 3 + y * 5) / 8) % 224;
            bytes.push((base + (state >> 28)) as u8);
        }
    }
    bytes
}

#[test]
fn fixtures_survive_pgm_to_png() {
    let dir = tempfile::tempdir().unwrap();
    for (name, bytes, depth) in [
        ("gradient.pgm", GRADIENT, BitDepth::Eight),
        ("deep.pgm", DEEP, BitDepth::Sixteen),
        ("plain.pgm", PLAIN, BitDepth::Eight),
    ] {
        let source = write_fixture(dir.path(), name, bytes);
        let dest = dir.path().join(name.replace(".pgm", ".png"));
        convert(&source, &dest).unwrap();

        let original = decode_file(&source).unwrap();
        let converted = decode_file(&dest).unwrap();
        assert_eq!(original.bit_depth(), depth, "{name}");
        assert_eq!(
            (converted.width(), converted.height()),
            (original.width(), original.height()),
            "{name}"
        );
        assert_eq!(converted.samples(), original.samples(), "{name}");
    }
}

#[test]
fn fixture_samples_decode_as_written() {
    let gradient = PGM::decode(GRADIENT).unwrap();
    assert_eq!((gradient.width(), gradient.height()), (64, 48));
    assert_eq!(gradient.get(0, 0), Some(127));

    let deep = PGM::decode(DEEP).unwrap();
    assert_eq!(deep.get(1, 0), Some(3000));
    assert_eq!(deep.get(0, 1), Some(401));

    let plain = PGM::decode(PLAIN).unwrap();
    assert_eq!(plain.rows().nth(1).unwrap(), &[0, 7, 14, 5, 12, 3]);
}

#[test]
fn lena_sized_image_converts_losslessly() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "Lena_gaussianBlur.pgm", &lena_sized_pgm());
    let dest = dir.path().join("output.png");
    let conversion = convert(&source, &dest).unwrap();
    assert_eq!((conversion.width, conversion.height), (512, 512));

    let png = PNG::decode(&fs::read(&dest).unwrap()).unwrap();
    let pgm = PGM::decode(&fs::read(&source).unwrap()).unwrap();
    assert_eq!((png.width(), png.height()), (512, 512));
    assert_eq!(png, pgm);
}

#[test]
fn converting_twice_gives_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "gradient.pgm", GRADIENT);
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.png");
    convert(&source, &first).unwrap();
    convert(&source, &second).unwrap();
    assert_eq!(decode_file(&first).unwrap(), decode_file(&second).unwrap());
}

#[test]
fn missing_source_is_a_decode_error_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("output.png");
    let err = convert(dir.path().join("missing.pgm"), &dest).unwrap_err();
    assert!(matches!(err, ConvertError::Decode { .. }), "{err:?}");
    assert!(!dest.exists());
}

#[test]
fn malformed_source_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let truncated = &GRADIENT[..GRADIENT.len() - 100];
    let source = write_fixture(dir.path(), "truncated.pgm", truncated);
    let dest = dir.path().join("output.png");
    let err = convert(&source, &dest).unwrap_err();
    assert!(matches!(err, ConvertError::Decode { .. }), "{err:?}");
    assert!(format!("{:#}", anyhow::Error::from(err)).contains("truncated"));
    assert!(!dest.exists());
}

#[test]
fn missing_destination_directory_is_an_encode_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "gradient.pgm", GRADIENT);
    let dest = dir.path().join("no-such-dir").join("output.png");
    let err = convert(&source, &dest).unwrap_err();
    assert!(matches!(err, ConvertError::Encode { .. }), "{err:?}");
    assert_eq!(err.path(), dest);
}

#[test]
fn existing_destination_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "plain.pgm", PLAIN);
    let dest = write_fixture(dir.path(), "output.png", b"stale contents");
    convert(&source, &dest).unwrap();
    assert_eq!(decode_file(&dest).unwrap(), PGM::decode(PLAIN).unwrap());
}

#[test]
fn png_converts_back_to_pgm() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "deep.pgm", DEEP);
    let png = dir.path().join("deep.png");
    let back = dir.path().join("back.pgm");
    convert(&source, &png).unwrap();
    let conversion = convert_with(
        &png,
        &back,
        &EncodeOptions {
            pgm_encoding: PgmEncoding::Plain,
            ..EncodeOptions::default()
        },
    )
    .unwrap();
    assert_eq!(conversion.source_format, ImageFormat::Png);
    assert_eq!(conversion.dest_format, ImageFormat::Pgm);
    assert!(fs::read(&back).unwrap().starts_with(b"P2\n20 10\n65535\n"));
    assert_eq!(decode_file(&back).unwrap(), PGM::decode(DEEP).unwrap());
}

#[test]
fn encode_options_keep_pixels_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "gradient.pgm", GRADIENT);
    let expected = PGM::decode(GRADIENT).unwrap();
    for (filter, interlacing, compression) in [
        (FilterStrategy::None, Interlacing::None, 0),
        (FilterStrategy::Paeth, Interlacing::Adam7, 10),
        (FilterStrategy::Adaptive, Interlacing::Adam7, 1),
    ] {
        let dest = dir.path().join("output.png");
        let options = EncodeOptions {
            filter,
            interlacing,
            compression,
            ..EncodeOptions::default()
        };
        convert_with(&source, &dest, &options).unwrap();
        assert_eq!(decode_file(&dest).unwrap(), expected, "{options:?}");
    }
}

#[test]
fn large_images_span_several_idat_chunks() {
    let image = PGM::decode(&lena_sized_pgm()).unwrap();
    let options = EncodeOptions {
        filter: FilterStrategy::None,
        compression: 0,
        ..EncodeOptions::default()
    };
    let bytes = PNG::encode(&image, &options);
    let chunk_types: Vec<String> = PNG::chunks(&bytes)
        .unwrap()
        .into_iter()
        .map(|chunk| chunk.chunk_type)
        .collect();
    insta::assert_debug_snapshot!(chunk_types, @r###"
    [
        "IHDR",
        "IDAT",
        "IDAT",
        "IDAT",
        "IDAT",
        "IDAT",
        "IEND",
    ]
    "###);
    assert_eq!(PNG::decode(&bytes).unwrap(), image);
}

#[test]
fn one_bit_png_keeps_samples_through_pgm() {
    let samples = vec![1, 0, 1, 1, 0, 0, 1, 0, 1, 0, 0, 0, 1, 1, 1, 1, 0, 1];
    let image = Image::new(9, 2, BitDepth::One, samples).unwrap();
    let pgm = PGM::decode(&PGM::encode(&image, PgmEncoding::Raw)).unwrap();
    assert_eq!(pgm.samples(), image.samples());
    assert_eq!(pgm.bit_depth(), BitDepth::Eight);
}

#[test]
fn cli_uses_default_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "Lena_gaussianBlur.pgm", GRADIENT);
    let output = Command::new(env!("CARGO_BIN_EXE_pgm2png"))
        .arg("-v")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let printed = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(printed.matches("Saved image: output.png").count(), 1, "{printed}");
    assert_eq!(
        decode_file(dir.path().join("output.png")).unwrap(),
        PGM::decode(GRADIENT).unwrap()
    );
}

#[test]
fn cli_exits_with_failure_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(dir.path(), "gradient.pgm", GRADIENT);

    let output = Command::new(env!("CARGO_BIN_EXE_pgm2png"))
        .arg(&source)
        .arg(dir.path().join("missing-dir").join("output.png"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to encode"));

    let dest = dir.path().join("output.png");
    let output = Command::new(env!("CARGO_BIN_EXE_pgm2png"))
        .arg(dir.path().join("missing.pgm"))
        .arg(&dest)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to decode"));
    assert!(!dest.exists());
}

#[test]
fn batch_convert_records_converted_and_failed_images() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    let output = dir.path().join("output");
    fs::create_dir(&input).unwrap();
    write_fixture(&input, "gradient.pgm", GRADIENT);
    write_fixture(&input, "broken.pgm", &GRADIENT[..GRADIENT.len() - 100]);
    write_fixture(&input, "notes.txt", b"not an image");

    let status = Command::new(env!("CARGO_BIN_EXE_batch-convert"))
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    assert_eq!(
        decode_file(output.join("gradient.png")).unwrap(),
        PGM::decode(GRADIENT).unwrap()
    );
    assert!(!output.join("broken.png").exists());
    assert!(!output.join("notes.png").exists());

    let results: serde_json::Value =
        serde_json::from_slice(&fs::read(output.join("results.json")).unwrap()).unwrap();
    assert!(results["date"].as_str().is_some_and(|date| !date.is_empty()));
    let converted = results["converted"].as_array().unwrap();
    assert_eq!(converted.len(), 1);
    assert_eq!(converted[0]["name"], "gradient");
    assert_eq!(converted[0]["width"], 64);
    assert_eq!(converted[0]["height"], 48);
    assert_eq!(converted[0]["bit_depth"], 8);
    let failed = results["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["name"], "broken");
    assert!(failed[0]["error"].as_str().unwrap().contains("truncated"));
}
