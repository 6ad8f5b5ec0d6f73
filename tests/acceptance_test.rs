//! Acceptance tests
//!
//! Behavioural guarantees of the public engine API: determinism, endpoint
//! exactness, conservation and the concrete reference scenarios.

mod common;

use common::{default_engine, no_overshoot, setup_engine};
use ghost_engine::behavior::{render_text, Point, ScrollMode};
use ghost_engine::transport::{ProfileFilter, RotationStrategy, PROFILES};
use ghost_engine::EngineConfig;

// ============================================================================
// Determinism
// ============================================================================

#[tokio::test]
async fn test_path_repeats_after_reset() {
    let engine = default_engine();
    let from = Point::new(12.0, 40.0);
    let to = Point::new(640.0, 410.0);

    let first = engine.mouse_path("alice", from, to).await.unwrap();
    assert!(engine.reset("alice"));
    let second = engine.mouse_path("alice", from, to).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_whole_session_repeats_after_reset() {
    let engine = default_engine();

    let run = || async {
        let path = engine
            .mouse_path("dora", Point::new(0.0, 0.0), Point::new(200.0, 200.0))
            .await
            .unwrap();
        let click = engine.click_timing("dora").await.unwrap();
        let keys = engine.keystrokes("dora", "repeatable").await.unwrap();
        let scroll = engine.scroll_steps("dora", 1200).await.unwrap();
        (path, click, keys, scroll)
    };

    let first = run().await;
    engine.reset("dora");
    let second = run().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_identities_diverge() {
    let engine = default_engine();
    let from = Point::new(0.0, 0.0);
    let to = Point::new(400.0, 300.0);

    let a = engine.mouse_path("alice", from, to).await.unwrap();
    let b = engine.mouse_path("bob", from, to).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_engines_agree_across_instances() {
    let a = default_engine();
    let b = default_engine();
    let from = Point::new(5.0, 5.0);
    let to = Point::new(90.0, 700.0);

    assert_eq!(
        a.mouse_path("restart", from, to).await.unwrap(),
        b.mouse_path("restart", from, to).await.unwrap()
    );
    assert_eq!(
        a.keystrokes("restart", "same person").await.unwrap(),
        b.keystrokes("restart", "same person").await.unwrap()
    );
}

// ============================================================================
// Motion
// ============================================================================

#[tokio::test]
async fn test_endpoints_exact_with_overshoot() {
    let mut config = EngineConfig::default();
    config.motion.overshoot_probability = 1.0;
    let (engine, _) = setup_engine(config);

    for i in 0..50 {
        let identity = format!("overshooter-{}", i);
        let from = Point::new(10.0 + i as f64, 20.0);
        let to = Point::new(700.0, 300.0 + i as f64 * 3.0);
        let path = engine.mouse_path(&identity, from, to).await.unwrap();

        assert_eq!(path.first(), Some(from));
        assert_eq!(path.last(), Some(to));
        assert_eq!(path.points.len(), path.timestamps_ms.len());
        for w in path.timestamps_ms.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }
}

#[tokio::test]
async fn test_alice_reference_path() {
    let (engine, _) = setup_engine(no_overshoot());
    let path = engine
        .mouse_path("alice", Point::new(0.0, 0.0), Point::new(300.0, 0.0))
        .await
        .unwrap();

    assert!(path.len() >= 10, "only {} points", path.len());
    for w in path.timestamps_ms.windows(2) {
        assert!(w[1] > w[0], "timestamps not strictly increasing: {:?}", w);
    }

    let ceiling = 50.0 + 150.0 * 601f64.log2() + 300.0;
    let duration = path.duration_ms();
    assert!((50.0..=ceiling).contains(&duration), "duration {}", duration);
}

#[tokio::test]
async fn test_zero_distance_path() {
    let engine = default_engine();
    let here = Point::new(42.0, 42.0);
    let path = engine.mouse_path("still", here, here).await.unwrap();

    assert_eq!(path.duration_ms(), 0.0);
    assert_eq!(path.first(), Some(here));
    assert_eq!(path.last(), Some(here));
}

// ============================================================================
// Scroll
// ============================================================================

#[tokio::test]
async fn test_scroll_conservation_all_modes() {
    for mode in [ScrollMode::Smooth, ScrollMode::Stepped, ScrollMode::Mixed] {
        let mut config = EngineConfig::default();
        config.scroll.mode = mode;
        let (engine, _) = setup_engine(config);

        for distance in [-5000i64, -333, -1, 0, 1, 99, 100, 101, 2718, 10_000] {
            let plan = engine.scroll_steps("scroller", distance).await.unwrap();
            assert_eq!(plan.total_px(), distance, "{:?} {}", mode, distance);
        }
    }
}

// ============================================================================
// Keystrokes
// ============================================================================

#[tokio::test]
async fn test_bob_types_cat() {
    let mut config = EngineConfig::default();
    config.keystroke.typo_rate = 0.0;
    config.keystroke.typing_speed = 280.0;
    let (engine, _) = setup_engine(config);

    let events = engine.keystrokes("bob", "cat").await.unwrap();
    let keys: Vec<&str> = events.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["c", "a", "t"]);
    assert!(!events.iter().any(|e| e.is_backspace()));
}

#[tokio::test]
async fn test_typo_transparency() {
    let texts = [
        "hello world",
        "The Quick Brown Fox!",
        "p@ssw0rd?",
        "",
        "mixed ünïcödé text",
    ];

    for rate in [0.0, 0.05, 0.3, 1.0] {
        for correction in [true, false] {
            let mut config = EngineConfig::default();
            config.keystroke.typo_rate = rate;
            config.keystroke.correction_enabled = correction;
            let (engine, _) = setup_engine(config);

            for text in texts {
                let events = engine.keystrokes("typist", text).await.unwrap();
                assert_eq!(render_text(&events), text, "rate {} correction {}", rate, correction);
            }
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_per_identity_profile_stable() {
    let engine = default_engine();
    let first = engine
        .profile_for("steady", RotationStrategy::PerIdentity, &ProfileFilter::any())
        .unwrap();
    for _ in 0..1000 {
        let profile = engine
            .profile_for("steady", RotationStrategy::PerIdentity, &ProfileFilter::any())
            .unwrap();
        assert_eq!(profile.id, first.id);
    }
}

#[tokio::test]
async fn test_cipher_order_preserved() {
    let engine = default_engine();
    for i in 0..200 {
        let identity = format!("cipher-{}", i);
        for strategy in [
            RotationStrategy::Static,
            RotationStrategy::PerCall,
            RotationStrategy::PerIdentity,
            RotationStrategy::Adaptive,
        ] {
            let profile = engine
                .profile_for(&identity, strategy, &ProfileFilter::any())
                .unwrap();
            let table = PROFILES.iter().find(|p| p.id == profile.id).unwrap();
            assert_eq!(profile.cipher_suites, table.cipher_suites);
        }
    }
}

// ============================================================================
// Render
// ============================================================================

#[tokio::test]
async fn test_fingerprint_idempotence() {
    let engine = default_engine();
    let a = engine.render_fingerprint("erin", 280, 60).unwrap();
    let b = engine.render_fingerprint("erin", 280, 60).unwrap();
    assert_eq!(a, b);

    let other = engine.render_fingerprint("erin", 300, 150).unwrap();
    assert_ne!(a.hash, other.hash);
}

#[tokio::test]
async fn test_hardware_is_per_identity() {
    let engine = default_engine();
    assert_eq!(
        engine.hardware_profile("frank").unwrap(),
        engine.hardware_profile("frank").unwrap()
    );

    let distinct: std::collections::HashSet<_> = (0..50)
        .map(|i| {
            let hw = engine.hardware_profile(&format!("machine-{}", i)).unwrap();
            (hw.gpu_renderer, hw.hardware_concurrency, hw.device_memory)
        })
        .collect();
    assert!(distinct.len() > 5);
}
