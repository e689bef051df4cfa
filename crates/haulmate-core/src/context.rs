//! AppContext - the explicitly constructed shared state.
//!
//! One context per process: the builder wires up the slot store, the media
//! library, every repository, the chat client and the news feed, loading
//! each repository from its slot as it goes. Consumers (a mobile shell, the
//! CLI, tests) receive the context by reference; nothing here is global.
//!
//! All members sit behind `Arc`, so cloning the context clones pointers,
//! not data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chat::{ChatClient, ChatConfig};
use crate::media::MediaLibrary;
use crate::news::NewsFeed;
use crate::paths;
use crate::repos::{
    CollectionRepo, DocumentRepo, DriverId, EmergencyContact, GalleryPhoto, HealthInsurance,
    Place, ProfileRepo, ScannedFile, Sound, SoundPlayer, SoundSettingsRepo, Trailer,
    TruckProfile, DRIVER_ID_SLOT, EMERGENCY_CONTACTS_SLOT, GALLERY_PAYLOAD_LIMIT,
    GALLERY_PHOTOS_SLOT, HEALTH_INSURANCE_SLOT, PLACES_SLOT, SCANNED_FILES_SLOT, TRAILERS_SLOT,
    TRUCK_PROFILE_SLOT,
};
use crate::storage::SlotStore;

/// Default static feed document.
pub const DEFAULT_FEED_URL: &str = "https://haulmate-news.pages.dev/feed.json";

/// Configuration for building an [`AppContext`].
#[derive(Default)]
pub struct AppContextBuilder {
    data_dir: Option<PathBuf>,
    chat_config: Option<ChatConfig>,
    feed_url: Option<String>,
    sound_player: Option<Arc<dyn SoundPlayer>>,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data directory holding slots and the media library.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the chat endpoint configuration.
    pub fn chat_config(mut self, config: ChatConfig) -> Self {
        self.chat_config = Some(config);
        self
    }

    /// Override the news feed URL.
    pub fn feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = Some(url.into());
        self
    }

    /// Attach a sound player.
    pub fn sound_player(mut self, player: Arc<dyn SoundPlayer>) -> Self {
        self.sound_player = Some(player);
        self
    }

    /// Build the context, loading every repository from its slot.
    ///
    /// Falls back to the platform default data directory when none was set;
    /// fails only when that default cannot be determined.
    pub fn build(self) -> Result<AppContext, String> {
        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => paths::default_data_dir()?,
        };

        let store = Arc::new(SlotStore::new(&data_dir));
        let library = Arc::new(MediaLibrary::new(&data_dir));

        let chat_config = self
            .chat_config
            .unwrap_or_else(|| ChatConfig::new("https://api.openai.com/v1/chat/completions", ""));
        let feed_url = self.feed_url.unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

        Ok(AppContext {
            data_dir,
            truck: Arc::new(ProfileRepo::load(
                TRUCK_PROFILE_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
            )),
            trailers: Arc::new(CollectionRepo::load(
                TRAILERS_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
            )),
            places: Arc::new(CollectionRepo::load(
                PLACES_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
            )),
            contacts: Arc::new(CollectionRepo::load(
                EMERGENCY_CONTACTS_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
            )),
            insurance: Arc::new(DocumentRepo::load(
                HEALTH_INSURANCE_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
            )),
            driver_id: Arc::new(DocumentRepo::load(
                DRIVER_ID_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
            )),
            files: Arc::new(CollectionRepo::load(
                SCANNED_FILES_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
            )),
            gallery: Arc::new(CollectionRepo::load_with(
                GALLERY_PHOTOS_SLOT,
                Arc::clone(&store),
                Arc::clone(&library),
                true,
                Some(GALLERY_PAYLOAD_LIMIT),
            )),
            sounds: Arc::new(SoundSettingsRepo::load(Arc::clone(&store))),
            chat: Arc::new(ChatClient::new(chat_config)),
            news: Arc::new(NewsFeed::new(feed_url, Arc::clone(&store))),
            sound_player: self.sound_player,
            store,
            library,
        })
    }
}

/// Shared state for every Haulmate operation.
#[derive(Clone)]
pub struct AppContext {
    data_dir: PathBuf,
    pub store: Arc<SlotStore>,
    pub library: Arc<MediaLibrary>,
    pub truck: Arc<ProfileRepo<TruckProfile>>,
    pub trailers: Arc<CollectionRepo<Trailer>>,
    pub places: Arc<CollectionRepo<Place>>,
    pub contacts: Arc<CollectionRepo<EmergencyContact>>,
    pub insurance: Arc<DocumentRepo<HealthInsurance>>,
    pub driver_id: Arc<DocumentRepo<DriverId>>,
    pub files: Arc<CollectionRepo<ScannedFile>>,
    pub gallery: Arc<CollectionRepo<GalleryPhoto>>,
    pub sounds: Arc<SoundSettingsRepo>,
    pub chat: Arc<ChatClient>,
    pub news: Arc<NewsFeed>,
    sound_player: Option<Arc<dyn SoundPlayer>>,
}

impl AppContext {
    /// Create a new AppContext with a builder.
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    /// The data directory this context persists under.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Play a sound effect if a player is attached and the setting allows.
    pub fn play_sound(&self, sound: Sound) {
        if let Some(player) = &self.sound_player {
            if self.sounds.is_enabled(sound) {
                player.play(sound);
            }
        }
    }

    /// Release held resources (the sound player's audio device).
    pub fn shutdown(&self) {
        if let Some(player) = &self.sound_player {
            player.shutdown();
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

    fn build(dir: &Path) -> AppContext {
        AppContext::builder().data_dir(dir).build().unwrap()
    }

    #[test]
    fn builder_loads_empty_repositories() {
        let dir = tempdir().unwrap();
        let ctx = build(dir.path());

        assert!(ctx.trailers.is_empty());
        assert!(ctx.insurance.get().is_none());
        assert!(ctx.truck.get().make.is_empty());
        assert!(ctx.sounds.is_enabled(Sound::Startup));
    }

    #[test]
    fn context_is_cheaply_clonable() {
        let dir = tempdir().unwrap();
        let ctx = build(dir.path());
        let ctx2 = ctx.clone();

        assert!(Arc::ptr_eq(&ctx.trailers, &ctx2.trailers));
        assert!(Arc::ptr_eq(&ctx.store, &ctx2.store));
    }

    #[test]
    fn repositories_share_one_store() {
        let dir = tempdir().unwrap();
        let ctx = build(dir.path());

        ctx.trailers
            .create(crate::repos::Trailer::draft("Flatbed"))
            .unwrap();

        assert!(dir.path().join("trailers.json").exists());
        assert_eq!(ctx.data_dir(), dir.path());
    }

    #[test]
    fn state_survives_a_second_context() {
        let dir = tempdir().unwrap();

        let created = {
            let ctx = build(dir.path());
            ctx.trailers
                .create(crate::repos::Trailer::draft("Reefer"))
                .unwrap()
        };

        let ctx = build(dir.path());
        assert_eq!(ctx.trailers.get(&created.id).unwrap().name, "Reefer");
    }

    #[test]
    fn play_sound_respects_settings_and_player() {
        struct CountingPlayer(AtomicUsize);
        impl SoundPlayer for CountingPlayer {
            fn play(&self, _sound: Sound) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dir = tempdir().unwrap();
        let player = Arc::new(CountingPlayer(AtomicUsize::new(0)));
        let ctx = AppContext::builder()
            .data_dir(dir.path())
            .sound_player(Arc::clone(&player) as Arc<dyn SoundPlayer>)
            .build()
            .unwrap();

        ctx.play_sound(Sound::Click);
        assert_eq!(player.0.load(Ordering::SeqCst), 1);

        let mut settings = ctx.sounds.get();
        settings.click_sound_enabled = false;
        ctx.sounds.save(settings).unwrap();

        ctx.play_sound(Sound::Click);
        assert_eq!(player.0.load(Ordering::SeqCst), 1);

        ctx.shutdown();
    }

    #[test]
    fn play_sound_without_player_is_a_noop() {
        let dir = tempdir().unwrap();
        let ctx = build(dir.path());

        ctx.play_sound(Sound::Startup);
        ctx.shutdown();
    }
}
