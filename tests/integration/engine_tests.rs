//! Engine integration tests through the public library API.
//!
//! Tests verify:
//! - The end-to-end density example
//! - Descriptor invariants (fixed box across DPR entries, no mixed descriptors)
//! - Per-format URL triples and absolute sources
//! - Engine cache sharing across tasks

use std::sync::Arc;

use pixelway::client::{get_format_support_from_ua, get_optimal_dpr_values, DprOptions};
use pixelway::compose::UrlComposer;
use pixelway::engine::{EngineCache, ImageEngine, RenderRequest};
use pixelway::responsive::parse_image_sizes;
use pixelway::transform::{self, Background, Extract, FitMode, ImageFormat, TransformSet};

use super::test_utils::{acme_config, descriptors, SAFARI_IOS_16_4, TEST_BASE_URL};

#[test]
fn test_acme_end_to_end() {
    let engine = ImageEngine::new(acme_config()).unwrap();
    let request = RenderRequest::new("p.jpg")
        .with_size(Some(800.0), Some(600.0))
        .with_network_adjustment(false);

    let data = engine.generate_image_data(&request).unwrap();

    assert!(data.url.contains("w=800"));
    assert!(data.url.contains("h=600"));
    assert!(data.url.contains("quality=80"));
    assert_eq!(descriptors(&data.src_set), vec!["1x", "2x", "3x"]);
    assert!(data
        .src_set
        .split(", ")
        .all(|entry| entry.contains("w=800&h=600")));
}

#[test]
fn test_dpr_srcset_holds_box_fixed() {
    let composer = UrlComposer::new(TEST_BASE_URL, "image");
    let src_set = composer.build_dpr_srcset(
        "a.jpg",
        Some(120),
        Some(80),
        &TransformSet::new(),
        &[1.0, 1.5, 2.0, 3.0],
        Some("acme"),
    );

    let entries: Vec<&str> = src_set.split(", ").collect();
    assert_eq!(entries.len(), 4);
    for (entry, dpr) in entries.iter().zip(["1", "1.5", "2", "3"]) {
        let expected = format!(
            "{}/image/acme/a.jpg?w=120&h=80&dpr={} {}x",
            TEST_BASE_URL, dpr, dpr
        );
        assert_eq!(*entry, expected);
    }
}

#[test]
fn test_descriptors_never_mixed() {
    let engine = ImageEngine::new(acme_config()).unwrap();
    let requests = [
        RenderRequest::new("p.jpg").with_size(Some(500.0), None),
        RenderRequest::new("p.jpg").with_fill(true),
        RenderRequest::new("p.jpg").with_sizes("(max-width: 768px) 100vw, 50vw"),
        RenderRequest::new("p.jpg").with_sizes("garbage"),
    ];

    for request in &requests {
        let data = engine.generate_image_data(request).unwrap();
        let descriptors = descriptors(&data.src_set);
        let widths = descriptors.iter().filter(|d| d.ends_with('w')).count();
        let densities = descriptors.iter().filter(|d| d.ends_with('x')).count();
        assert!(
            widths == 0 || densities == 0,
            "mixed descriptors: {}",
            data.src_set
        );
        assert!(!descriptors.is_empty());
    }
}

#[test]
fn test_transform_query_round_trip() {
    let transforms = TransformSet {
        width: Some(640),
        height: Some(480),
        fit: Some(FitMode::Cover),
        flip: Some(false),
        brightness: Some(1.5),
        extract: Some(Extract {
            x: 0,
            y: 0,
            width: 100,
            height: 50,
        }),
        background: Some(Background::opaque(255, 255, 255)),
        quality: Some(75),
        format: Some(ImageFormat::Webp),
        ..Default::default()
    };

    let query = transform::serialize(&transforms);
    assert!(query.contains("extract=0%2C0%2C100%2C50"));
    assert_eq!(transform::parse(&query), transforms);
}

#[test]
fn test_format_urls_for_absolute_source() {
    let engine = ImageEngine::new(acme_config()).unwrap();
    let transforms = TransformSet::new().with_size(Some(300), None);
    let urls = engine.composer().build_format_urls(
        "https://assets.example.com/a.png?v=1",
        &transforms,
        None,
    );

    assert_eq!(urls.avif, "https://assets.example.com/a.png?v=1&w=300&format=avif");
    assert_eq!(urls.webp, "https://assets.example.com/a.png?v=1&w=300&format=webp");
    assert_eq!(urls.original, "https://assets.example.com/a.png?v=1&w=300");
}

#[test]
fn test_user_agent_support_drives_format() {
    let engine = ImageEngine::new(acme_config()).unwrap();
    let request = RenderRequest::new("p.jpg")
        .with_size(Some(200.0), None)
        .with_format_support(get_format_support_from_ua(SAFARI_IOS_16_4));

    let data = engine.generate_image_data(&request).unwrap();
    assert_eq!(data.transforms.format, Some(ImageFormat::Avif));
    assert!(data.url.ends_with("format=avif"));
}

#[test]
fn test_sizes_and_density_helpers() {
    assert_eq!(parse_image_sizes("400px 400px 800px"), vec![400, 800]);
    let widths = parse_image_sizes("50vw");
    assert!(widths.contains(&188));
    assert!(widths.contains(&960));

    assert_eq!(
        get_optimal_dpr_values(&DprOptions::custom(vec![1.0, 2.0, 3.0, 4.0], 2.0)),
        vec![1.0, 2.0]
    );
}

#[tokio::test]
async fn test_engine_cache_shared_across_tasks() {
    let cache = Arc::new(EngineCache::new());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let engine = cache.get_or_create(&acme_config()).unwrap();
                let request = RenderRequest::new(format!("img-{}.jpg", i))
                    .with_size(Some(100.0), None)
                    .with_network_adjustment(false);
                (engine.clone(), engine.generate_image_data(&request).unwrap())
            })
        })
        .collect();

    let mut engines = Vec::new();
    for handle in handles {
        let (engine, data) = handle.await.unwrap();
        assert!(data.url.contains("/image/acme/img-"));
        engines.push(engine);
    }

    assert_eq!(cache.len(), 1);
    assert!(engines.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}
