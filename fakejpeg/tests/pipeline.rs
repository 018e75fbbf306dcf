// Copyright (c) the fakejpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use fakejpeg::generate::scan_length_range;
use fakejpeg::{Chunk, Error, Generator, Marker, TemplateStore, parse};
use fakejpeg_test_utils::{JpegBuilder, baseline_jpeg, progressive_jpeg};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

fn corpus() -> Vec<(String, Vec<u8>)> {
    vec![
        ("camera.jpg".to_string(), baseline_jpeg(4000)),
        ("not_a_jpeg.txt".to_string(), b"hello world".to_vec()),
        ("progressive.jpg".to_string(), progressive_jpeg(&[300, 1200, 50, 2500])),
        (
            "cut_short.jpg".to_string(),
            baseline_jpeg(4000)[..1000].to_vec(),
        ),
        (
            "no_metadata.jpg".to_string(),
            JpegBuilder::new()
                .soi()
                .dqt()
                .sof0(8, 8)
                .dht()
                .scan(&fakejpeg_test_utils::BASELINE_SCAN_HEADER, &[0x55; 64])
                .eoi()
                .build(),
        ),
    ]
}

#[test]
fn build_persist_generate() {
    let mut failed = Vec::new();
    let store = TemplateStore::from_buffers_with_reporter(corpus(), |id, err| {
        failed.push(id.clone());
        assert!(matches!(
            err,
            Error::InvalidMarker(_) | Error::UnexpectedEndOfData
        ));
    });
    assert_eq!(failed, vec!["not_a_jpeg.txt", "cut_short.jpg"]);
    assert_eq!(store.len(), 3);

    let mut file = Vec::new();
    store.write_to(&mut file).unwrap();
    let loaded = TemplateStore::read_from(&mut file.as_slice()).unwrap();
    assert_eq!(loaded, store);

    let generator = Generator::default();
    let mut rng = XorShiftRng::seed_from_u64(2024);
    for _ in 0..50 {
        let fake = generator
            .generate(&loaded, Some("synthetic"), &mut rng)
            .unwrap();
        let template = parse(&fake).unwrap();
        // The comment is dropped again on re-parse; everything else lines up
        // with one of the stored templates.
        let matches_some_template = loaded.templates().iter().any(|source| {
            source.chunks().len() == template.chunks().len()
                && source
                    .chunks()
                    .iter()
                    .zip(template.chunks())
                    .all(|(want, got)| match (want, got) {
                        (
                            Chunk::Scan { preamble, scan_len },
                            Chunk::Scan {
                                preamble: got_preamble,
                                scan_len: got_len,
                            },
                        ) => {
                            preamble == got_preamble
                                && scan_length_range(*scan_len, 10).contains(got_len)
                        }
                        _ => want == got,
                    })
        });
        assert!(matches_some_template);
        assert_eq!(&fake[fake.len() - 2..], &Marker::Eoi.to_be_bytes());
    }
}

#[test]
fn concurrent_generation_shares_one_store() {
    let store = TemplateStore::from_buffers(corpus());
    let outputs: Vec<Vec<u8>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4u64)
            .map(|seed| {
                let store = &store;
                s.spawn(move || {
                    let mut rng = XorShiftRng::seed_from_u64(seed);
                    let mut total = Vec::new();
                    for _ in 0..20 {
                        total.extend(fakejpeg::generate(store, None, &mut rng).unwrap());
                    }
                    total
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (seed, output) in outputs.iter().enumerate() {
        let mut rng = XorShiftRng::seed_from_u64(seed as u64);
        let mut expected = Vec::new();
        for _ in 0..20 {
            expected.extend(fakejpeg::generate(&store, None, &mut rng).unwrap());
        }
        assert_eq!(output, &expected);
    }
}

#[test]
fn empty_store_cannot_generate() {
    let store = TemplateStore::from_buffers(vec![("junk", vec![0u8; 16])]);
    assert!(store.is_empty());
    let bytes = store.to_bytes().unwrap();
    let loaded = TemplateStore::from_bytes(&bytes).unwrap();
    let mut rng = XorShiftRng::seed_from_u64(0);
    assert!(matches!(
        fakejpeg::generate(&loaded, Some("x"), &mut rng),
        Err(Error::EmptyTemplateSet)
    ));
}
