//! Benchmarks for the image preparation pipeline.
//!
//! Run with: cargo bench -p alttext-core

use alttext_core::config::{ImageConfig, LimitsConfig};
use alttext_core::pipeline::{Hasher, ImageDecoder, ImageEncoder, ImagePreparer};
use alttext_core::Config;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// A gradient so the encoders have real work to do.
fn sample_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    sample_image(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encode fixture");
    buffer.into_inner()
}

fn benchmark_content_hash(c: &mut Criterion) {
    let bytes = sample_png(1024, 768);

    c.bench_function("content_hash_blake3", |b| {
        b.iter(|| Hasher::content_hash(black_box(&bytes)))
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let bytes = sample_png(1024, 768);
    let decoder = ImageDecoder::new(LimitsConfig::default());
    let rt = tokio::runtime::Runtime::new().expect("runtime");

    c.bench_function("decode_png_1024", |b| {
        b.iter(|| rt.block_on(decoder.decode_from_bytes(black_box(bytes.clone()))))
    });
}

fn benchmark_resize_encode(c: &mut Criterion) {
    let img = sample_image(3000, 2000);
    let encoder = ImageEncoder::new(ImageConfig::default());

    c.bench_function("resize_encode_jpeg_3000", |b| {
        b.iter(|| {
            let resized = encoder.resize(black_box(img.clone()));
            encoder.encode(&resized)
        })
    });
}

fn benchmark_prepare(c: &mut Criterion) {
    let bytes = sample_png(2048, 1536);
    let preparer = ImagePreparer::new(&Config::default());
    let rt = tokio::runtime::Runtime::new().expect("runtime");

    c.bench_function("prepare_png_2048", |b| {
        b.iter(|| rt.block_on(preparer.prepare(black_box(bytes.clone()))))
    });
}

criterion_group!(
    benches,
    benchmark_content_hash,
    benchmark_decode,
    benchmark_resize_encode,
    benchmark_prepare
);
criterion_main!(benches);
