//! Global hotkey support via evdev
//!
//! Reads keyboard events directly from /dev/input/event* devices so the
//! overlay can be driven while any other application has focus. Triggered
//! bindings are posted to the engine queue as intents.

use evdev::{Device, InputEventKind, Key};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

use crate::config::HotkeyConfig;
use crate::error::{Result, RondoError};
use crate::events::{EngineEvent, UiIntent};

/// A hotkey binding (modifier keys + trigger key)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    /// Modifier keys that must be held
    pub modifiers: HashSet<Key>,
    /// The trigger key
    pub key: Key,
    /// The intent to post
    pub intent: UiIntent,
}

impl Hotkey {
    /// Create a new hotkey binding
    pub fn new(modifiers: impl IntoIterator<Item = Key>, key: Key, intent: UiIntent) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            key,
            intent,
        }
    }

    /// Parse a hotkey string like "ctrl+shift+f10"
    pub fn parse(s: &str, intent: UiIntent) -> Result<Self> {
        let lowercase = s.to_lowercase();
        let parts: Vec<&str> = lowercase.split('+').collect();
        if parts.is_empty() {
            return Err(RondoError::config("Empty hotkey string"));
        }

        let mut modifiers = HashSet::new();
        let mut key = None;

        for part in parts {
            let part = part.trim();
            match part {
                "ctrl" | "control" => {
                    modifiers.insert(Key::KEY_LEFTCTRL);
                }
                "alt" => {
                    modifiers.insert(Key::KEY_LEFTALT);
                }
                "shift" => {
                    modifiers.insert(Key::KEY_LEFTSHIFT);
                }
                "super" | "meta" | "win" => {
                    modifiers.insert(Key::KEY_LEFTMETA);
                }
                _ => {
                    key = Some(parse_key(part)?);
                }
            }
        }

        let key = key.ok_or_else(|| RondoError::config("No key specified in hotkey"))?;

        Ok(Self {
            modifiers,
            key,
            intent,
        })
    }
}

/// Parse a key name to an evdev Key
fn parse_key(name: &str) -> Result<Key> {
    let key = match name.to_lowercase().as_str() {
        // Function keys
        "f1" => Key::KEY_F1,
        "f2" => Key::KEY_F2,
        "f3" => Key::KEY_F3,
        "f4" => Key::KEY_F4,
        "f5" => Key::KEY_F5,
        "f6" => Key::KEY_F6,
        "f7" => Key::KEY_F7,
        "f8" => Key::KEY_F8,
        "f9" => Key::KEY_F9,
        "f10" => Key::KEY_F10,
        "f11" => Key::KEY_F11,
        "f12" => Key::KEY_F12,

        // Letters
        "a" => Key::KEY_A,
        "b" => Key::KEY_B,
        "c" => Key::KEY_C,
        "d" => Key::KEY_D,
        "e" => Key::KEY_E,
        "f" => Key::KEY_F,
        "g" => Key::KEY_G,
        "h" => Key::KEY_H,
        "i" => Key::KEY_I,
        "j" => Key::KEY_J,
        "k" => Key::KEY_K,
        "l" => Key::KEY_L,
        "m" => Key::KEY_M,
        "n" => Key::KEY_N,
        "o" => Key::KEY_O,
        "p" => Key::KEY_P,
        "q" => Key::KEY_Q,
        "r" => Key::KEY_R,
        "s" => Key::KEY_S,
        "t" => Key::KEY_T,
        "u" => Key::KEY_U,
        "v" => Key::KEY_V,
        "w" => Key::KEY_W,
        "x" => Key::KEY_X,
        "y" => Key::KEY_Y,
        "z" => Key::KEY_Z,

        // Special keys
        "space" => Key::KEY_SPACE,
        "enter" | "return" => Key::KEY_ENTER,
        "escape" | "esc" => Key::KEY_ESC,
        "tab" => Key::KEY_TAB,
        "pause" => Key::KEY_PAUSE,
        "printscreen" | "print" | "prtsc" => Key::KEY_SYSRQ,

        _ => return Err(RondoError::config(format!("Unknown key: {}", name))),
    };

    Ok(key)
}

/// Global hotkey listener
pub struct HotkeyListener {
    hotkeys: Vec<Hotkey>,
    events_tx: Sender<EngineEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl HotkeyListener {
    /// Create a listener from the configured bindings
    pub fn from_config(config: &HotkeyConfig, events_tx: Sender<EngineEvent>) -> Result<Self> {
        let hotkeys = vec![
            Hotkey::parse(&config.toggle, UiIntent::ToggleRecording)?,
            Hotkey::parse(&config.cancel, UiIntent::CancelAll)?,
        ];
        Ok(Self {
            hotkeys,
            events_tx,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        })
    }

    /// Start listening for hotkeys
    pub fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let hotkeys = self.hotkeys.clone();
        let events_tx = self.events_tx.clone();
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        let thread = std::thread::Builder::new()
            .name("rondo-hotkeys".to_string())
            .spawn(move || {
                if let Err(e) = run_hotkey_loop(hotkeys, events_tx, running.clone()) {
                    error!("Hotkey listener error: {}", e);
                }
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| RondoError::config(format!("Failed to spawn hotkey thread: {}", e)))?;

        self.thread_handle = Some(thread);
        info!("Hotkey listener started");

        Ok(())
    }

    /// Stop listening for hotkeys
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }

        info!("Hotkey listener stopped");
    }

    /// Check if the listener is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Find keyboard devices
fn find_keyboard_devices() -> Vec<Device> {
    let mut devices = Vec::new();

    for entry in std::fs::read_dir("/dev/input").into_iter().flatten().flatten() {
        let path = entry.path();
        if path.to_string_lossy().contains("event") {
            match Device::open(&path) {
                Ok(device) => {
                    if device.supported_keys().map_or(false, |keys| {
                        keys.contains(Key::KEY_A) && keys.contains(Key::KEY_ENTER)
                    }) {
                        debug!(
                            "Found keyboard device: {:?} - {}",
                            path,
                            device.name().unwrap_or("unknown")
                        );
                        devices.push(device);
                    }
                }
                Err(e) => {
                    trace!("Could not open {:?}: {}", path, e);
                }
            }
        }
    }

    devices
}

/// Run the hotkey listening loop
fn run_hotkey_loop(
    hotkeys: Vec<Hotkey>,
    events_tx: Sender<EngineEvent>,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let mut devices = find_keyboard_devices();

    if devices.is_empty() {
        warn!("No keyboard devices found. Hotkeys will not work.");
        warn!("You may need to add your user to the 'input' group.");
        return Err(RondoError::config("No keyboard devices found"));
    }

    info!("Monitoring {} keyboard device(s) for hotkeys", devices.len());

    let mut pressed_keys: HashSet<Key> = HashSet::new();

    while running.load(Ordering::SeqCst) {
        for device in &mut devices {
            if let Ok(events) = device.fetch_events() {
                for event in events {
                    if let InputEventKind::Key(key) = event.kind() {
                        match event.value() {
                            1 => {
                                pressed_keys.insert(key);
                                trace!("Key pressed: {:?}", key);

                                for hotkey in &hotkeys {
                                    if check_hotkey(&pressed_keys, hotkey) {
                                        info!("Hotkey triggered: {:?}", hotkey.intent);
                                        if events_tx
                                            .send(EngineEvent::Intent(hotkey.intent.clone()))
                                            .is_err()
                                        {
                                            debug!("Engine queue closed");
                                            return Ok(());
                                        }
                                    }
                                }
                            }
                            0 => {
                                pressed_keys.remove(&key);
                                trace!("Key released: {:?}", key);
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    Ok(())
}

/// Check if a hotkey matches the currently pressed keys
fn check_hotkey(pressed: &HashSet<Key>, hotkey: &Hotkey) -> bool {
    if !pressed.contains(&hotkey.key) {
        return false;
    }

    for modifier in &hotkey.modifiers {
        let modifier_pressed = match *modifier {
            Key::KEY_LEFTCTRL => {
                pressed.contains(&Key::KEY_LEFTCTRL) || pressed.contains(&Key::KEY_RIGHTCTRL)
            }
            Key::KEY_LEFTALT => {
                pressed.contains(&Key::KEY_LEFTALT) || pressed.contains(&Key::KEY_RIGHTALT)
            }
            Key::KEY_LEFTSHIFT => {
                pressed.contains(&Key::KEY_LEFTSHIFT) || pressed.contains(&Key::KEY_RIGHTSHIFT)
            }
            Key::KEY_LEFTMETA => {
                pressed.contains(&Key::KEY_LEFTMETA) || pressed.contains(&Key::KEY_RIGHTMETA)
            }
            _ => pressed.contains(modifier),
        };

        if !modifier_pressed {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hotkey() {
        let hotkey = Hotkey::parse("ctrl+shift+f10", UiIntent::ToggleRecording).unwrap();
        assert_eq!(hotkey.key, Key::KEY_F10);
        assert!(hotkey.modifiers.contains(&Key::KEY_LEFTCTRL));
        assert!(hotkey.modifiers.contains(&Key::KEY_LEFTSHIFT));
        assert_eq!(hotkey.intent, UiIntent::ToggleRecording);
    }

    #[test]
    fn test_parse_simple_key() {
        let hotkey = Hotkey::parse("f10", UiIntent::ToggleRecording).unwrap();
        assert_eq!(hotkey.key, Key::KEY_F10);
        assert!(hotkey.modifiers.is_empty());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("f10").unwrap(), Key::KEY_F10);
        assert_eq!(parse_key("esc").unwrap(), Key::KEY_ESC);
        assert_eq!(parse_key("a").unwrap(), Key::KEY_A);
        assert!(parse_key("invalid").is_err());
    }

    #[test]
    fn test_check_hotkey() {
        let hotkey = Hotkey::new(
            [Key::KEY_LEFTCTRL, Key::KEY_LEFTSHIFT],
            Key::KEY_F10,
            UiIntent::ToggleRecording,
        );

        // Missing modifier
        let pressed: HashSet<Key> = [Key::KEY_LEFTCTRL, Key::KEY_F10].into_iter().collect();
        assert!(!check_hotkey(&pressed, &hotkey));

        // All modifiers + key
        let pressed: HashSet<Key> = [Key::KEY_LEFTCTRL, Key::KEY_LEFTSHIFT, Key::KEY_F10]
            .into_iter()
            .collect();
        assert!(check_hotkey(&pressed, &hotkey));

        // Right ctrl works too
        let pressed: HashSet<Key> = [Key::KEY_RIGHTCTRL, Key::KEY_LEFTSHIFT, Key::KEY_F10]
            .into_iter()
            .collect();
        assert!(check_hotkey(&pressed, &hotkey));
    }
}
