//! Sound settings and the playback seam.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::storage::SlotStore;

use super::RepoError;

pub const SOUND_SETTINGS_SLOT: &str = "sound_settings";

/// UI sound toggles. Both default to enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SoundSettings {
    #[serde(default = "default_true")]
    pub startup_sound_enabled: bool,

    #[serde(default = "default_true")]
    pub click_sound_enabled: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            startup_sound_enabled: true,
            click_sound_enabled: true,
        }
    }
}

/// Helper for serde default value.
fn default_true() -> bool {
    true
}

/// The sound effects the app can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Startup,
    Click,
}

/// Playback seam.
///
/// An implementation is constructed explicitly by whoever owns audio output
/// and handed to the context; `shutdown` releases the underlying device.
/// The core itself never touches an audio backend.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, sound: Sound);

    fn shutdown(&self) {}
}

/// Repository for the sound settings slot.
pub struct SoundSettingsRepo {
    store: Arc<SlotStore>,
    settings: Mutex<SoundSettings>,
}

impl SoundSettingsRepo {
    /// Load settings, defaulting (and self-healing) to all-enabled.
    pub fn load(store: Arc<SlotStore>) -> Self {
        let settings = store.load_or_default(SOUND_SETTINGS_SLOT);
        Self {
            store,
            settings: Mutex::new(settings),
        }
    }

    pub fn get(&self) -> SoundSettings {
        self.settings.lock().unwrap().clone()
    }

    /// Persist new settings; the in-memory copy commits only after the
    /// write succeeds.
    pub fn save(&self, next: SoundSettings) -> Result<SoundSettings, RepoError> {
        self.store.save_json(SOUND_SETTINGS_SLOT, &next)?;
        *self.settings.lock().unwrap() = next.clone();
        Ok(next)
    }

    /// Whether the given sound is currently enabled.
    pub fn is_enabled(&self, sound: Sound) -> bool {
        let settings = self.settings.lock().unwrap();
        match sound {
            Sound::Startup => settings.startup_sound_enabled,
            Sound::Click => settings.click_sound_enabled,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[test]
    fn defaults_are_all_enabled() {
        let dir = tempdir().unwrap();
        let repo = SoundSettingsRepo::load(Arc::new(SlotStore::new(dir.path())));

        assert!(repo.is_enabled(Sound::Startup));
        assert!(repo.is_enabled(Sound::Click));
    }

    #[test]
    fn save_and_reload() {
        let dir = tempdir().unwrap();
        let store = Arc::new(SlotStore::new(dir.path()));

        {
            let repo = SoundSettingsRepo::load(Arc::clone(&store));
            repo.save(SoundSettings {
                startup_sound_enabled: false,
                click_sound_enabled: true,
            })
            .unwrap();
        }

        let repo = SoundSettingsRepo::load(store);
        assert!(!repo.is_enabled(Sound::Startup));
        assert!(repo.is_enabled(Sound::Click));
    }

    #[test]
    fn partial_slot_takes_defaults() {
        let dir = tempdir().unwrap();
        let store = Arc::new(SlotStore::new(dir.path()));
        store
            .write_raw(SOUND_SETTINGS_SLOT, r#"{"startupSoundEnabled":false}"#)
            .unwrap();

        let repo = SoundSettingsRepo::load(store);

        assert!(!repo.is_enabled(Sound::Startup));
        assert!(repo.is_enabled(Sound::Click));
    }

    #[test]
    fn player_seam_is_invocable() {
        struct CountingPlayer(AtomicUsize);
        impl SoundPlayer for CountingPlayer {
            fn play(&self, _sound: Sound) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let player = CountingPlayer(AtomicUsize::new(0));
        player.play(Sound::Click);
        player.play(Sound::Startup);
        player.shutdown();

        assert_eq!(player.0.load(Ordering::SeqCst), 2);
    }
}
