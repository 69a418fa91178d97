//! Persisted settings and the startup-gated write policy.
//!
//! Two copies of the [`Settings`] record exist. Settings-view knob writes
//! update the *local* copy and raise a dirty flag; once per tick
//! [`SettingsStore::drain`] commits the local copy into the *durable* copy
//! and issues a single write, but never while the engine is starting up.
//! A burst of knob motion therefore costs one write, issued when it is safe.

/// The persisted settings record.
///
/// Every field is stored normalized to `0.0..=1.0`, exactly as the knob that
/// edits it reads; the router derives engine values from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Input gain, as a fraction of the maximum gain.
    pub input_gain: f32,
    /// Filter type selector (thirds: LP / BP / HP).
    pub filter_type: f32,
    /// Loop sync flag (on at 0.5 and above).
    pub loop_sync: f32,
    /// Filter level.
    pub filter_level: f32,
    /// Read-rate slew.
    pub rate_slew: f32,
    /// Stereo width.
    pub stereo_width: f32,
    /// Buffer degradation amount.
    pub degradation: f32,
}

impl Settings {
    /// Number of fields in the record.
    pub const FIELD_COUNT: usize = 7;

    /// Compiled-in record used on first boot and when the durable record
    /// cannot be read.
    pub const DEFAULT: Settings = Settings {
        input_gain: 1.0 / 5.0,
        filter_type: 0.5,
        loop_sync: 0.0,
        filter_level: 0.5,
        rate_slew: 0.0,
        stereo_width: 1.0,
        degradation: 0.0,
    };

    /// Field values in record order.
    pub const fn to_array(&self) -> [f32; Self::FIELD_COUNT] {
        [
            self.input_gain,
            self.filter_type,
            self.loop_sync,
            self.filter_level,
            self.rate_slew,
            self.stereo_width,
            self.degradation,
        ]
    }

    /// Builds a record from values in record order.
    pub const fn from_array(values: [f32; Self::FIELD_COUNT]) -> Self {
        Self {
            input_gain: values[0],
            filter_type: values[1],
            loop_sync: values[2],
            filter_level: values[3],
            rate_slew: values[4],
            stereo_width: values[5],
            degradation: values[6],
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Non-volatile storage for the settings record.
///
/// Writes are fire-and-forget from the control plane's point of view: a
/// failed save is logged and dropped, never retried.
pub trait SettingsStorage {
    /// Error reported by the medium.
    type Error: core::fmt::Debug;

    /// Reads the stored record.
    fn load(&mut self) -> Result<Settings, Self::Error>;

    /// Replaces the stored record atomically.
    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error>;
}

impl<S: SettingsStorage + ?Sized> SettingsStorage for &mut S {
    type Error = S::Error;

    fn load(&mut self) -> Result<Settings, Self::Error> {
        (**self).load()
    }

    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        (**self).save(settings)
    }
}

/// Errors reported by [`MemoryStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStorageError {
    /// Nothing has been stored yet.
    Empty,
    /// The storage was configured to fail.
    Unavailable,
}

/// In-memory settings storage that counts writes.
///
/// # Example
///
/// ```rust
/// use ostinato_platform::{MemoryStorage, Settings, SettingsStorage};
///
/// let mut storage = MemoryStorage::default();
/// assert!(storage.load().is_err());
/// storage.save(&Settings::DEFAULT).unwrap();
/// assert_eq!(storage.load().unwrap(), Settings::DEFAULT);
/// assert_eq!(storage.writes(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    stored: Option<Settings>,
    writes: usize,
    failing: bool,
}

impl MemoryStorage {
    /// Creates a storage already holding `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            stored: Some(settings),
            ..Self::default()
        }
    }

    /// Makes every subsequent load and save fail.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// The stored record, if any.
    pub fn stored(&self) -> Option<&Settings> {
        self.stored.as_ref()
    }

    /// Number of successful saves.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsStorage for MemoryStorage {
    type Error = MemoryStorageError;

    fn load(&mut self) -> Result<Settings, Self::Error> {
        if self.failing {
            return Err(MemoryStorageError::Unavailable);
        }
        self.stored.ok_or(MemoryStorageError::Empty)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        if self.failing {
            return Err(MemoryStorageError::Unavailable);
        }
        self.stored = Some(*settings);
        self.writes += 1;
        Ok(())
    }
}

/// What a call to [`SettingsStore::drain`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing to do.
    Clean,
    /// Dirty, but the engine is starting up; retried next tick.
    Deferred,
    /// Dirty period closed without a write: local already matched durable.
    Unchanged,
    /// The record was written.
    Written,
    /// The write failed; the failure was dropped.
    Failed,
}

/// Local and durable settings copies plus the dirty flag.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    local: Settings,
    durable: Settings,
    dirty: bool,
}

impl SettingsStore {
    /// Creates a store whose copies both hold `settings`.
    pub const fn new(settings: Settings) -> Self {
        Self {
            local: settings,
            durable: settings,
            dirty: false,
        }
    }

    /// Loads the durable record, falling back to [`Settings::DEFAULT`] when
    /// the storage cannot be read.
    pub fn load<S: SettingsStorage>(storage: &mut S) -> Self {
        match storage.load() {
            Ok(settings) => Self::new(settings),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(err = ?_err, "settings: read failed, using defaults");
                Self::new(Settings::DEFAULT)
            }
        }
    }

    /// The working copy edited by the settings view.
    #[inline]
    pub fn local(&self) -> &Settings {
        &self.local
    }

    /// The last committed copy.
    #[inline]
    pub fn durable(&self) -> &Settings {
        &self.durable
    }

    /// True while the local copy has uncommitted edits.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Edits the local copy and marks it dirty.
    pub fn edit(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.local);
        self.dirty = true;
    }

    /// Commits the local copy if it is dirty and the engine is past startup.
    pub fn drain<S: SettingsStorage>(&mut self, storage: &mut S, starting_up: bool) -> DrainOutcome {
        if !self.dirty {
            return DrainOutcome::Clean;
        }
        if starting_up {
            return DrainOutcome::Deferred;
        }
        self.dirty = false;

        if self.local == self.durable {
            return DrainOutcome::Unchanged;
        }

        match storage.save(&self.local) {
            Ok(()) => {
                self.durable = self.local;
                #[cfg(feature = "tracing")]
                tracing::debug!("settings: committed durable record");
                DrainOutcome::Written
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(err = ?_err, "settings: durable write failed");
                DrainOutcome::Failed
            }
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record() {
        let d = Settings::default();
        assert!((d.input_gain - 0.2).abs() < 1e-6);
        assert_eq!(d.filter_type, 0.5);
        assert_eq!(d.loop_sync, 0.0);
        assert_eq!(d.filter_level, 0.5);
        assert_eq!(d.rate_slew, 0.0);
        assert_eq!(d.stereo_width, 1.0);
        assert_eq!(d.degradation, 0.0);
    }

    #[test]
    fn test_array_roundtrip_keeps_order() {
        let values = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let settings = Settings::from_array(values);
        assert_eq!(settings.loop_sync, 0.3);
        assert_eq!(settings.stereo_width, 0.6);
        assert_eq!(settings.to_array(), values);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let mut empty = MemoryStorage::default();
        assert_eq!(*SettingsStore::load(&mut empty).durable(), Settings::DEFAULT);

        let mut broken = MemoryStorage::with_settings(Settings::from_array([0.9; 7]));
        broken.set_failing(true);
        assert_eq!(*SettingsStore::load(&mut broken).local(), Settings::DEFAULT);
    }

    #[test]
    fn test_load_seeds_both_copies() {
        let stored = Settings::from_array([0.9; 7]);
        let mut storage = MemoryStorage::with_settings(stored);
        let store = SettingsStore::load(&mut storage);
        assert_eq!(*store.local(), stored);
        assert_eq!(*store.durable(), stored);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_edit_marks_dirty_without_touching_durable() {
        let mut store = SettingsStore::default();
        store.edit(|s| s.stereo_width = 0.25);
        assert!(store.is_dirty());
        assert_eq!(store.local().stereo_width, 0.25);
        assert_eq!(store.durable().stereo_width, 1.0);
    }

    #[test]
    fn test_drain_deferred_while_starting_up() {
        let mut storage = MemoryStorage::default();
        let mut store = SettingsStore::default();
        store.edit(|s| s.loop_sync = 1.0);

        assert_eq!(store.drain(&mut storage, true), DrainOutcome::Deferred);
        assert_eq!(store.drain(&mut storage, true), DrainOutcome::Deferred);
        assert!(store.is_dirty());
        assert_eq!(storage.writes(), 0);

        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Written);
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.stored().map(|s| s.loop_sync), Some(1.0));
    }

    #[test]
    fn test_drain_coalesces_a_burst() {
        let mut storage = MemoryStorage::default();
        let mut store = SettingsStore::default();
        for i in 0..10 {
            store.edit(|s| s.input_gain = i as f32 / 10.0);
        }
        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Written);
        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Clean);
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.stored().map(|s| s.input_gain), Some(0.9));
    }

    #[test]
    fn test_drain_skips_identical_record() {
        let mut storage = MemoryStorage::default();
        let mut store = SettingsStore::default();
        store.edit(|s| s.filter_type = 0.5);
        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Unchanged);
        assert!(!store.is_dirty());
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn test_failed_write_is_not_retried() {
        let mut storage = MemoryStorage::default();
        storage.set_failing(true);
        let mut store = SettingsStore::default();
        store.edit(|s| s.degradation = 0.4);

        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Failed);
        assert!(!store.is_dirty());
        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Clean);
    }

    #[test]
    fn test_failed_write_leaves_durable_copy_behind() {
        let mut storage = MemoryStorage::default();
        storage.set_failing(true);
        let mut store = SettingsStore::default();
        store.edit(|s| s.stereo_width = 0.25);
        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Failed);
        assert_eq!(store.durable().stereo_width, 1.0);

        storage.set_failing(false);
        store.edit(|s| s.stereo_width = 0.25);
        assert_eq!(store.drain(&mut storage, false), DrainOutcome::Written);
        assert_eq!(storage.stored().map(|s| s.stereo_width), Some(0.25));
        assert_eq!(store.durable().stereo_width, 0.25);
    }
}
