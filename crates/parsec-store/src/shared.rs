//! Coarse exclusive access to a store shared across worker threads.

use std::sync::{Arc, Mutex, MutexGuard};

use parsec_core::{ConfigError, StoreConfig};

use crate::store::ParticleStore;

/// A [`ParticleStore`] behind one coarse mutex, clonable across worker
/// threads.
///
/// Add/remove are the only operations that mutate shared state, and a
/// growth they trigger reallocates every attribute column — so all
/// structural mutation on one store is serialized under a single lock.
/// Any column view fetched under a previous lock must be re-fetched
/// after another thread may have mutated the store.
///
/// Pure attribute reads outside the lock are coordinated at a coarser
/// level by the caller (mutation confined to a synchronization phase);
/// this type does not attempt to police that.
#[derive(Clone)]
pub struct SharedParticleStore {
    inner: Arc<Mutex<ParticleStore>>,
}

impl SharedParticleStore {
    /// Construct a shared store from a validated config.
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(ParticleStore::new(config)?)),
        })
    }

    /// Wrap an existing store.
    pub fn from_store(store: ParticleStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// A poisoned mutex means a mutation panicked mid-operation and the
    /// accounting can no longer be trusted; that is unrecoverable, so
    /// this panics rather than limp on.
    pub fn with<R>(&self, f: impl FnOnce(&mut ParticleStore) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Take the lock directly, for multi-step mutation sequences.
    ///
    /// Panics on a poisoned mutex, as [`with`](Self::with) does.
    pub fn lock(&self) -> MutexGuard<'_, ParticleStore> {
        self.inner.lock().expect("particle store mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DensityLedger;
    use parsec_core::{InterpScheme, Level, ParticleInit};

    fn shared_store() -> SharedParticleStore {
        let mut config = StoreConfig::new(0);
        config.interp = Some(InterpScheme::CloudInCell);
        SharedParticleStore::new(config).unwrap()
    }

    #[test]
    fn with_gives_exclusive_access() {
        let shared = shared_store();
        let ghost = shared.with(|store| store.ghost_size());
        assert_eq!(ghost, 1);
    }

    #[test]
    fn clones_share_one_store() {
        let shared = shared_store();
        let clone = shared.clone();

        let mut density = 0.0;
        shared.with(|store| {
            store
                .add_one(
                    &ParticleInit::with_mass(1.0),
                    &[],
                    Level(0),
                    DensityLedger::new(&mut density, 1.0),
                )
                .unwrap();
        });
        assert_eq!(clone.with(|store| store.count_active()), 1);
    }

    #[test]
    fn concurrent_adds_are_serialized() {
        let shared = shared_store();
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        let mut density = 0.0;
                        shared.with(|store| {
                            store
                                .add_one(
                                    &ParticleInit::with_mass(1.0),
                                    &[],
                                    Level(0),
                                    DensityLedger::new(&mut density, 1.0),
                                )
                                .unwrap();
                        });
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        shared.with(|store| {
            assert_eq!(store.count_active(), 1000);
            store.validate().unwrap();
        });
    }
}
