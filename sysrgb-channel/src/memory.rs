//! In-memory LED channel
//!
//! Behaves like a sysfs node without touching the filesystem. Handles are
//! cheap clones sharing one node, so a test can keep a handle while the
//! keyboard layer owns another.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::ChannelError;
use crate::types::{Brightness, NodeSpec, Rgb};
use crate::{ChannelBackend, LedChannel};

/// One recorded write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteRecord {
    Color(Rgb),
    Brightness(Brightness),
}

#[derive(Debug)]
struct Node {
    name: String,
    present: AtomicBool,
    brightness_supported: bool,
    max_brightness: Brightness,
    color: Mutex<Rgb>,
    brightness: Mutex<Brightness>,
    history: Mutex<Vec<WriteRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    write_delay: Mutex<Duration>,
    in_flight: AtomicBool,
    overlaps: AtomicUsize,
}

/// In-memory LED node handle
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    node: Arc<Node>,
}

impl MemoryChannel {
    /// Create a present node from its spec
    pub fn new(spec: &NodeSpec) -> Self {
        Self {
            node: Arc::new(Node {
                name: spec.name.clone(),
                present: AtomicBool::new(true),
                brightness_supported: spec.brightness,
                max_brightness: spec.max_brightness.unwrap_or(Brightness::MAX),
                color: Mutex::new(Rgb::BLACK),
                brightness: Mutex::new(0),
                history: Mutex::new(Vec::new()),
                fail_writes: AtomicBool::new(false),
                fail_reads: AtomicBool::new(false),
                write_delay: Mutex::new(Duration::ZERO),
                in_flight: AtomicBool::new(false),
                overlaps: AtomicUsize::new(0),
            }),
        }
    }

    /// Simulate the node (dis)appearing
    pub fn set_present(&self, present: bool) {
        self.node.present.store(present, Ordering::SeqCst);
    }

    /// Make every following write fail with an I/O error
    pub fn set_fail_writes(&self, fail: bool) {
        self.node.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every following read fail with an I/O error
    pub fn set_fail_reads(&self, fail: bool) {
        self.node.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Hold each write open for `delay`, widening the window in which
    /// overlapping writers would be detected
    pub fn set_write_delay(&self, delay: Duration) {
        *self.node.write_delay.lock() = delay;
    }

    /// Set the node contents without counting a write
    pub fn preset_color(&self, color: Rgb) {
        *self.node.color.lock() = color;
    }

    /// Set the brightness contents without counting a write
    pub fn preset_brightness(&self, brightness: Brightness) {
        *self.node.brightness.lock() = brightness;
    }

    /// Current node color
    pub fn color(&self) -> Rgb {
        *self.node.color.lock()
    }

    /// Current node brightness
    pub fn brightness(&self) -> Brightness {
        *self.node.brightness.lock()
    }

    /// Every successful write in order
    pub fn history(&self) -> Vec<WriteRecord> {
        self.node.history.lock().clone()
    }

    /// Number of successful writes of either kind
    pub fn write_count(&self) -> usize {
        self.node.history.lock().len()
    }

    /// Successful color writes
    pub fn color_writes(&self) -> Vec<Rgb> {
        self.history()
            .into_iter()
            .filter_map(|w| match w {
                WriteRecord::Color(c) => Some(c),
                WriteRecord::Brightness(_) => None,
            })
            .collect()
    }

    /// Successful brightness writes
    pub fn brightness_writes(&self) -> Vec<Brightness> {
        self.history()
            .into_iter()
            .filter_map(|w| match w {
                WriteRecord::Brightness(b) => Some(b),
                WriteRecord::Color(_) => None,
            })
            .collect()
    }

    /// How many times a write started while another was still in flight
    pub fn overlapping_writes(&self) -> usize {
        self.node.overlaps.load(Ordering::SeqCst)
    }

    fn fake_path(&self, file: &str) -> PathBuf {
        PathBuf::from("memory").join(&self.node.name).join(file)
    }

    fn write(&self, file: &str, record: WriteRecord) -> Result<(), ChannelError> {
        if self.node.in_flight.swap(true, Ordering::SeqCst) {
            self.node.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let delay = *self.node.write_delay.lock();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let result = if !self.node.present.load(Ordering::SeqCst) {
            Err(io::Error::new(io::ErrorKind::NotFound, "node not present"))
        } else if self.node.fail_writes.load(Ordering::SeqCst) {
            Err(io::Error::other("injected write failure"))
        } else {
            Ok(())
        };
        let result = match result {
            Ok(()) => {
                match record {
                    WriteRecord::Color(c) => *self.node.color.lock() = c,
                    WriteRecord::Brightness(b) => *self.node.brightness.lock() = b,
                }
                self.node.history.lock().push(record);
                Ok(())
            }
            Err(source) => Err(ChannelError::Write {
                path: self.fake_path(file),
                source,
            }),
        };
        self.node.in_flight.store(false, Ordering::SeqCst);
        result
    }

    fn check_read(&self, file: &str) -> Result<(), ChannelError> {
        let source = if !self.node.present.load(Ordering::SeqCst) {
            io::Error::new(io::ErrorKind::NotFound, "node not present")
        } else if self.node.fail_reads.load(Ordering::SeqCst) {
            io::Error::other("injected read failure")
        } else {
            return Ok(());
        };
        Err(ChannelError::Read {
            path: self.fake_path(file),
            source,
        })
    }
}

impl LedChannel for MemoryChannel {
    fn node(&self) -> &str {
        &self.node.name
    }

    fn is_present(&self) -> bool {
        self.node.present.load(Ordering::SeqCst)
    }

    fn supports_brightness(&self) -> bool {
        self.node.brightness_supported
    }

    fn max_brightness(&self) -> Option<Brightness> {
        self.node
            .brightness_supported
            .then_some(self.node.max_brightness)
    }

    fn write_color(&self, color: Rgb) -> Result<(), ChannelError> {
        self.write("multi_intensity", WriteRecord::Color(color))
    }

    fn write_brightness(&self, brightness: Brightness) -> Result<(), ChannelError> {
        if !self.node.brightness_supported {
            return Err(ChannelError::NoBrightness {
                node: self.node.name.clone(),
            });
        }
        self.write("brightness", WriteRecord::Brightness(brightness))
    }

    fn read_color(&self) -> Result<Rgb, ChannelError> {
        self.check_read("multi_intensity")?;
        Ok(self.color())
    }

    fn read_brightness(&self) -> Result<Brightness, ChannelError> {
        if !self.node.brightness_supported {
            return Err(ChannelError::Read {
                path: self.fake_path("brightness"),
                source: io::Error::new(io::ErrorKind::NotFound, "no brightness file"),
            });
        }
        self.check_read("brightness")?;
        Ok(self.brightness())
    }
}

/// Backend handing out [`MemoryChannel`]s and keeping a handle to each
#[derive(Debug, Default)]
pub struct MemoryBackend {
    channels: Mutex<BTreeMap<String, MemoryChannel>>,
    absent: Mutex<HashSet<String>>,
    all_absent: bool,
}

impl MemoryBackend {
    /// Every node present
    pub fn new() -> Self {
        Self::default()
    }

    /// No node present, as if the driver were not loaded
    pub fn disconnected() -> Self {
        Self {
            all_absent: true,
            ..Self::default()
        }
    }

    /// Mark a node as missing for channels opened afterwards
    pub fn mark_absent(&self, node: &str) {
        self.absent.lock().insert(node.to_string());
    }

    /// Handle to an opened node
    pub fn channel(&self, node: &str) -> Option<MemoryChannel> {
        self.channels.lock().get(node).cloned()
    }

    /// Names of all opened nodes
    pub fn nodes(&self) -> Vec<String> {
        self.channels.lock().keys().cloned().collect()
    }
}

impl ChannelBackend for MemoryBackend {
    fn open(&self, node: &NodeSpec) -> Box<dyn LedChannel> {
        let channel = self
            .channels
            .lock()
            .entry(node.name.clone())
            .or_insert_with(|| MemoryChannel::new(node))
            .clone();
        if self.all_absent || self.absent.lock().contains(&node.name) {
            channel.set_present(false);
        }
        Box::new(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let ch = MemoryChannel::new(&NodeSpec::with_brightness("rgb:kbd_backlight", Some(50)));
        for c in [Rgb::BLACK, Rgb::new(255, 1, 128), Rgb::WHITE] {
            ch.write_color(c).unwrap();
            assert_eq!(ch.read_color().unwrap(), c);
        }
        ch.write_brightness(33).unwrap();
        assert_eq!(ch.read_brightness().unwrap(), 33);
        assert_eq!(ch.max_brightness(), Some(50));
        assert_eq!(ch.write_count(), 4);
        assert_eq!(ch.brightness_writes(), vec![33]);
    }

    #[test]
    fn test_injected_failures() {
        let ch = MemoryChannel::new(&NodeSpec::color_only("n"));
        ch.set_fail_writes(true);
        assert!(ch.write_color(Rgb::RED).unwrap_err().is_write());
        assert_eq!(ch.write_count(), 0);
        assert_eq!(ch.color(), Rgb::BLACK);

        ch.set_fail_reads(true);
        assert!(ch.read_color().unwrap_err().is_read());

        assert!(matches!(
            ch.write_brightness(1),
            Err(ChannelError::NoBrightness { .. })
        ));
    }

    #[test]
    fn test_backend_shares_handles() {
        let backend = MemoryBackend::new();
        backend.mark_absent("rgb:lightbar");
        let boxed = backend.open(&NodeSpec::color_only("rgb:kbd_backlight_1"));
        let absent = backend.open(&NodeSpec::color_only("rgb:lightbar"));

        boxed.write_color(Rgb::GREEN).unwrap();
        let handle = backend.channel("rgb:kbd_backlight_1").unwrap();
        assert_eq!(handle.color(), Rgb::GREEN);

        assert!(!absent.is_present());
        assert!(absent.write_color(Rgb::RED).unwrap_err().is_not_found());
    }

    #[test]
    fn test_overlap_detection() {
        let ch = MemoryChannel::new(&NodeSpec::color_only("n"));
        ch.set_write_delay(Duration::from_millis(100));
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let spawn_writer = |color: Rgb| {
            let ch = ch.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                ch.write_color(color)
            })
        };
        let t1 = spawn_writer(Rgb::RED);
        let t2 = spawn_writer(Rgb::BLUE);
        t1.join().unwrap().unwrap();
        t2.join().unwrap().unwrap();
        // Two unsynchronized writers released together collide
        assert_eq!(ch.overlapping_writes(), 1);
    }
}
