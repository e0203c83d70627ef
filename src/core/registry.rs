//! Process-wide provider registry with memoized lookup
//!
//! Registration and the lookup-miss path go through one mutex around the
//! name → factory map. Hits are served from a separate read-mostly cache; every
//! mutation evicts the affected name from that cache while still holding the
//! registry lock, so a lookup can never return a factory that has been replaced.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError, RwLock};
use tracing::{debug, error, info};

use crate::core::config::TranslationConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::provider::{Provider, ProviderFactory};

/// Name → provider factory directory
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Mutex<BTreeMap<String, ProviderFactory>>,
    lookup_cache: RwLock<HashMap<String, ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by the free functions in this crate
    pub fn global() -> &'static ProviderRegistry {
        static GLOBAL: OnceLock<ProviderRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ProviderRegistry::new)
    }

    fn lock_providers(&self) -> MutexGuard<'_, BTreeMap<String, ProviderFactory>> {
        self.providers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict(&self, name: &str) {
        self.lookup_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    /// Checks shared by `register` and `replace`
    fn check_registration(name: &str, factory: &ProviderFactory) -> Result<()> {
        if name.trim().is_empty() {
            return Err(TranslationError::InvalidProviderName {
                name: name.to_string(),
            });
        }

        let required = &factory.info().min_supported_version;
        if !version_satisfies(crate::VERSION, required) {
            return Err(TranslationError::IncompatibleVersion {
                name: name.to_string(),
                required: required.clone(),
                current: crate::VERSION.to_string(),
            });
        }

        Ok(())
    }

    /// Register a provider under `name`.
    ///
    /// Fails with [`TranslationError::AlreadyRegistered`] if the name is taken;
    /// use [`ProviderRegistry::replace`] to overwrite deliberately.
    pub fn register(&self, name: impl Into<String>, factory: ProviderFactory) -> Result<()> {
        let name = name.into();
        Self::check_registration(&name, &factory)?;

        let mut providers = self.lock_providers();
        if providers.contains_key(&name) {
            return Err(TranslationError::AlreadyRegistered { name });
        }
        providers.insert(name.clone(), factory);
        self.evict(&name);
        drop(providers);

        info!("Registered translation provider: {}", name);
        Ok(())
    }

    /// Register a provider under `name`, overwriting any previous registration.
    ///
    /// Returns the factory that was replaced, if any.
    pub fn replace(
        &self,
        name: impl Into<String>,
        factory: ProviderFactory,
    ) -> Result<Option<ProviderFactory>> {
        let name = name.into();
        Self::check_registration(&name, &factory)?;

        let mut providers = self.lock_providers();
        let previous = providers.insert(name.clone(), factory);
        self.evict(&name);
        drop(providers);

        if previous.is_some() {
            info!("Replaced translation provider: {}", name);
        } else {
            info!("Registered translation provider: {}", name);
        }
        Ok(previous)
    }

    /// Look up the factory registered under `name`
    pub fn get(&self, name: &str) -> Result<ProviderFactory> {
        if let Some(factory) = self
            .lookup_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(factory.clone());
        }

        let providers = self.lock_providers();
        match providers.get(name) {
            Some(factory) => {
                self.lookup_cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(name.to_string(), factory.clone());
                debug!("Cached provider lookup: {}", name);
                Ok(factory.clone())
            }
            None => {
                let available: Vec<String> = providers.keys().cloned().collect();
                drop(providers);
                let err = TranslationError::ProviderNotFound {
                    name: name.to_string(),
                    available,
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Look up `name` and instantiate it with `config`
    pub fn create(&self, name: &str, config: TranslationConfig) -> Result<Provider> {
        self.get(name)?.create(config)
    }

    /// Registered names in lexicographic order
    pub fn list(&self) -> Vec<String> {
        self.lock_providers().keys().cloned().collect()
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.lock_providers().contains_key(name)
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.lock_providers().len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.lock_providers().is_empty()
    }
}

/// Compare dotted numeric versions; missing or non-numeric parts count as 0
fn version_satisfies(current: &str, required: &str) -> bool {
    fn parts(version: &str) -> Vec<u64> {
        version
            .split(['.', '-', '+'])
            .take(3)
            .map(|part| part.parse().unwrap_or(0))
            .collect()
    }

    let (mut current, mut required) = (parts(current), parts(required));
    current.resize(3, 0);
    required.resize(3, 0);
    current >= required
}

/// Register a provider in the global registry
pub fn register_provider(name: impl Into<String>, factory: ProviderFactory) -> Result<()> {
    ProviderRegistry::global().register(name, factory)
}

/// Look up a provider in the global registry
pub fn get_provider(name: &str) -> Result<ProviderFactory> {
    ProviderRegistry::global().get(name)
}

/// List the providers in the global registry
pub fn list_providers() -> Vec<String> {
    ProviderRegistry::global().list()
}
