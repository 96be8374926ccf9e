//! Integration tests for the animation engine.
//!
//! Everything runs against the in-memory backend: the engine's background
//! thread writes through the keyboard state into `MemoryChannel`s, and the
//! tests observe the recorded writes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use sysrgb::{
    Animation, AnimationEngine, AnimationError, AnimationKind, AnimationStatus, KeyboardError,
    KeyboardState, MemoryBackend, PlatformTable, PulseParams, RandomParams, RunStats,
    WaveParams,
};
use sysrgb_channel::NodeSpec;
use sysrgb_keyboard::KeySlot;

const FAST: Duration = Duration::from_millis(1);

fn small_table() -> PlatformTable {
    let mut table = PlatformTable::with_layout(vec![
        (0..6).map(|n| Some(KeySlot::new(format!("K{n}"), n))).collect(),
        (6..12).map(|n| Some(KeySlot::new(format!("K{n}"), n))).collect(),
    ]);
    table.lightbar = NodeSpec::with_brightness("rgb:lightbar", Some(255));
    table
}

fn setup() -> (Arc<MemoryBackend>, AnimationEngine) {
    let backend = Arc::new(MemoryBackend::new());
    let keyboard = KeyboardState::open(&small_table(), backend.as_ref()).unwrap();
    (backend, AnimationEngine::new(Arc::new(keyboard)))
}

fn total_writes(backend: &MemoryBackend) -> usize {
    backend
        .nodes()
        .iter()
        .filter_map(|n| backend.channel(n))
        .map(|c| c.write_count())
        .sum()
}

/// Poll `cond` until it holds or five seconds pass
fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

fn wave() -> Animation {
    Animation::Wave(WaveParams {
        interval: FAST,
        ..WaveParams::default()
    })
}

fn random() -> Animation {
    Animation::Random(RandomParams {
        interval: FAST,
        seed: Some(3),
        ..RandomParams::default()
    })
}

// ── Start / stop ──

#[test]
fn stop_is_synchronous_across_cycles() {
    let (backend, engine) = setup();
    for _ in 0..5 {
        let stats = engine.start(wave()).unwrap();
        assert_eq!(engine.status(), AnimationStatus::Running(AnimationKind::Wave));
        assert!(wait_until(|| stats.ticks() >= 3));

        engine.stop().unwrap();
        assert_eq!(engine.status(), AnimationStatus::Idle);
        let frozen = total_writes(&backend);
        let ticks = stats.ticks();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(total_writes(&backend), frozen);
        assert_eq!(stats.ticks(), ticks);
    }
}

#[test]
fn stop_when_idle_is_a_no_op() {
    let (_backend, engine) = setup();
    assert!(engine.stop().is_none());
    assert_eq!(engine.status(), AnimationStatus::Idle);
}

#[test]
fn stop_does_not_wait_a_full_interval() {
    let (_backend, engine) = setup();
    let stats = engine
        .start(Animation::Wave(WaveParams {
            interval: Duration::from_secs(60),
            ..WaveParams::default()
        }))
        .unwrap();
    assert!(wait_until(|| stats.ticks() >= 1));
    let start = Instant::now();
    engine.stop();
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn replacing_an_animation_never_interleaves_runs() {
    let backend = Arc::new(MemoryBackend::new());
    let keyboard = KeyboardState::open(&small_table(), backend.as_ref()).unwrap();
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&ticks);
    let engine = AnimationEngine::new(Arc::new(keyboard)).with_tick_hook(Arc::new(
        move |kind: AnimationKind| log.lock().unwrap().push(kind),
    ));

    let mut previous: Option<Arc<RunStats>> = None;
    for i in 0..6 {
        let next = if i % 2 == 0 { random() } else { wave() };
        let kind = next.kind();
        let stats = engine.start(next).unwrap();
        assert_eq!(engine.status(), AnimationStatus::Running(kind));

        // The replaced run is finished once start returns
        if let Some(old) = previous.take() {
            let frozen = old.ticks();
            thread::sleep(Duration::from_millis(10));
            assert_eq!(old.ticks(), frozen);
        }
        assert!(wait_until(|| stats.ticks() >= 2));
        previous = Some(stats);
    }
    engine.stop();

    // Runs alternate kinds, so six runs that never interleave give exactly
    // five changes of kind in the tick log
    let log = ticks.lock().unwrap();
    let switches = log.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(switches, 5, "{log:?}");
    assert_eq!(log.first(), Some(&AnimationKind::Random));
    assert_eq!(log.last(), Some(&AnimationKind::Wave));
}

#[test]
fn dropping_the_engine_stops_the_loop() {
    let (backend, engine) = setup();
    let stats = engine.start(wave()).unwrap();
    assert!(wait_until(|| stats.ticks() >= 2));
    drop(engine);
    let frozen = total_writes(&backend);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(total_writes(&backend), frozen);
}

// ── Start failures ──

#[test]
fn pulse_on_color_only_key_fails_and_stays_idle() {
    let (backend, engine) = setup();
    engine.start(wave()).unwrap();

    let err = engine
        .start(Animation::Pulse(PulseParams {
            target: "K3".into(),
            interval: FAST,
            ..PulseParams::default()
        }))
        .unwrap_err();
    assert!(matches!(
        err,
        AnimationError::Keyboard(KeyboardError::Unsupported(_))
    ));
    // The previous run was stopped before the new one was validated
    assert_eq!(engine.status(), AnimationStatus::Idle);
    let frozen = total_writes(&backend);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(total_writes(&backend), frozen);
}

#[test]
fn unknown_key_fails_to_start() {
    let (_backend, engine) = setup();
    let err = engine
        .start(Animation::Random(RandomParams {
            keys: vec!["nonexistent-key-xyz".into()],
            ..RandomParams::default()
        }))
        .unwrap_err();
    assert!(matches!(
        err,
        AnimationError::Keyboard(KeyboardError::UnknownKey(_))
    ));
    assert!(!engine.is_running());
}

// ── Tick failures ──

#[test]
fn failing_writes_do_not_stop_the_loop() {
    let backend = Arc::new(MemoryBackend::new());
    let keyboard = KeyboardState::open(&small_table(), backend.as_ref()).unwrap();
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&hook_calls);
    let engine = AnimationEngine::new(Arc::new(keyboard)).with_error_hook(Arc::new(
        move |kind: AnimationKind, err: &KeyboardError| {
            assert_eq!(kind, AnimationKind::Wave);
            assert_eq!(err.failures()[0].0, "K2");
            calls.fetch_add(1, Ordering::SeqCst);
        },
    ));

    let broken = backend.channel("rgb:kbd_backlight_2").unwrap();
    broken.set_fail_writes(true);

    let stats = engine.start(wave()).unwrap();
    assert!(wait_until(|| stats.ticks() >= 10));
    assert!(engine.is_running());
    engine.stop();

    assert_eq!(stats.errors(), stats.ticks());
    assert_eq!(hook_calls.load(Ordering::SeqCst) as u64, stats.errors());
    assert_eq!(broken.write_count(), 0);
    // Healthy keys kept animating
    let healthy = backend.channel("rgb:kbd_backlight_3").unwrap();
    assert_eq!(healthy.write_count() as u64, stats.ticks());
}

// ── Pulse ──

#[test]
fn pulse_brightness_is_a_triangle_wave() {
    let (backend, engine) = setup();
    let stats = engine
        .start(Animation::Pulse(PulseParams {
            target: "lightbar".into(),
            min: 0,
            max: None,
            step: 15,
            interval: FAST,
            ..PulseParams::default()
        }))
        .unwrap();
    assert!(wait_until(|| stats.ticks() >= 40));
    engine.stop();

    let seq = backend.channel("rgb:lightbar").unwrap().brightness_writes();
    assert!(seq.len() >= 40);
    assert!(seq.contains(&0));
    assert!(seq.contains(&255));
    for w in seq.windows(2) {
        assert_eq!(w[0].abs_diff(w[1]), 15);
    }
    for w in seq.windows(3) {
        let turned = (w[1] > w[0]) != (w[2] > w[1]);
        if turned {
            assert!(w[1] == 0 || w[1] == 255, "turned at {}", w[1]);
        }
    }
}

#[test]
fn tick_hook_sees_every_tick() {
    let backend = Arc::new(MemoryBackend::new());
    let keyboard = KeyboardState::open(&small_table(), backend.as_ref()).unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let engine = AnimationEngine::new(Arc::new(keyboard)).with_tick_hook(Arc::new(move |_: AnimationKind| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let stats = engine.start(random()).unwrap();
    assert!(wait_until(|| stats.ticks() >= 5));
    engine.stop();
    assert_eq!(seen.load(Ordering::SeqCst) as u64, stats.ticks());
}
