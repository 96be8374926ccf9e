//! Integration tests for profile files.
//!
//! Save a keyboard's state to disk in each format, load it into a second
//! keyboard and compare the LED nodes.

use std::fs;

use sysrgb::profile::{self, ProfileError};
use sysrgb::{KeyboardState, MemoryBackend, PlatformTable, Rgb};
use sysrgb_keyboard::ApplyWarning;
use tempfile::TempDir;

fn open() -> (MemoryBackend, KeyboardState) {
    let backend = MemoryBackend::new();
    let keyboard = KeyboardState::open(&PlatformTable::default(), &backend).unwrap();
    (backend, keyboard)
}

fn paint(keyboard: &KeyboardState) {
    keyboard.set_color_by_name("keyboard", Rgb::new(10, 20, 30)).unwrap();
    keyboard.set_color_by_name("Esc", Rgb::RED).unwrap();
    keyboard.set_color_by_name("Space", Rgb::BLUE).unwrap();
    keyboard.set_color_by_name("lightbar", Rgb::GREEN).unwrap();
    let target = keyboard.resolve("keyboard").unwrap();
    keyboard.set_brightness(&target, 33).unwrap();
}

// ── Save → load across formats ──

#[test]
fn saved_profile_restores_every_node() {
    let dir = TempDir::new().unwrap();
    for file in ["colors.txt", "colors.ini", "colors.json"] {
        let (_src_backend, src) = open();
        paint(&src);
        let path = dir.path().join(file);
        profile::save(&path, &src.snapshot()).unwrap();

        let (dst_backend, dst) = open();
        let decoded = profile::load(&path).unwrap();
        assert!(decoded.warnings.is_empty(), "{file}: {:?}", decoded.warnings);
        let report = dst.apply(&decoded.profile);
        assert!(report.is_clean(), "{file}: {report:?}");

        let node = |name: &str| dst_backend.channel(name).unwrap();
        assert_eq!(node("rgb:kbd_backlight_105").color(), Rgb::RED, "{file}");
        assert_eq!(node("rgb:kbd_backlight_7").color(), Rgb::BLUE, "{file}");
        assert_eq!(node("rgb:kbd_backlight_110").color(), Rgb::new(10, 20, 30), "{file}");
        assert_eq!(node("rgb:lightbar").color(), Rgb::GREEN, "{file}");
        assert_eq!(node("rgb:kbd_backlight").brightness(), 33, "{file}");
    }
}

// ── Partial and malformed files ──

#[test]
fn unknown_key_in_file_gives_one_warning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.txt");
    fs::write(
        &path,
        "Esc = #ff0000\nTurboButton = #00ff00\nF1 = #0000ff\nnot a line\n",
    )
    .unwrap();

    let decoded = profile::load(&path).unwrap();
    assert_eq!(decoded.warnings.len(), 1);
    assert_eq!(decoded.warnings[0].line, 4);

    let (backend, keyboard) = open();
    let report = keyboard.apply(&decoded.profile);
    assert_eq!(
        report.warnings,
        vec![ApplyWarning::UnknownKey("TurboButton".into())]
    );
    assert_eq!(report.applied, 2);
    assert_eq!(backend.channel("rgb:kbd_backlight_105").unwrap().color(), Rgb::RED);
    assert_eq!(backend.channel("rgb:kbd_backlight_106").unwrap().color(), Rgb::BLUE);
}

#[test]
fn broken_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"keys\": [").unwrap();
    assert!(matches!(profile::load(&path), Err(ProfileError::Json(_))));
}

#[test]
fn unwritable_destination_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing-dir").join("out.txt");
    let (_backend, keyboard) = open();
    assert!(matches!(
        profile::save(&path, &keyboard.snapshot()),
        Err(ProfileError::Write { .. })
    ));
}
