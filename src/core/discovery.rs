//! Provider discovery from declared entry points
//!
//! Provider crates declare themselves into [`PROVIDER_ENTRY_POINTS`] at link
//! time; nothing is registered until the host calls
//! [`ProviderRegistry::discover`].
//!
//! ```ignore
//! use mt_providers::core::discovery::{EntryPoint, ENTRY_POINT_GROUP, PROVIDER_ENTRY_POINTS};
//! use mt_providers::core::provider::ProviderFactory;
//!
//! #[linkme::distributed_slice(PROVIDER_ENTRY_POINTS)]
//! static DEEPL: EntryPoint = EntryPoint {
//!     group: ENTRY_POINT_GROUP,
//!     name: "deepl",
//!     load: || Ok(ProviderFactory::of::<DeepLProvider>()),
//! };
//! ```

use linkme::distributed_slice;
use tracing::{error, info, warn};

use crate::core::errors::{DiscoveryFailure, Result, TranslationError};
use crate::core::provider::ProviderFactory;
use crate::core::registry::ProviderRegistry;

/// Entry point group scanned by default
pub const ENTRY_POINT_GROUP: &str = "mt_providers";

/// A declared provider: a short name plus a way to load its factory
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint {
    /// Group identifier the entry is declared under
    pub group: &'static str,
    /// Declared short name
    pub name: &'static str,
    /// Load the provider factory
    pub load: fn() -> Result<ProviderFactory>,
}

/// Every provider entry point linked into the binary, collected by the linker
#[distributed_slice]
pub static PROVIDER_ENTRY_POINTS: [EntryPoint] = [..];

/// Something that can enumerate entry points for a group
pub trait EntryPointSource {
    /// Entry points declared under `group`
    fn entry_points(&self, group: &str) -> Result<Vec<EntryPoint>>;
}

/// Entry points collected in [`PROVIDER_ENTRY_POINTS`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedEntryPoints;

impl EntryPointSource for LinkedEntryPoints {
    fn entry_points(&self, group: &str) -> Result<Vec<EntryPoint>> {
        Ok(PROVIDER_ENTRY_POINTS
            .iter()
            .filter(|entry| entry.group == group)
            .copied()
            .collect())
    }
}

/// An explicit list of entry points
#[derive(Debug, Clone, Default)]
pub struct StaticEntryPoints {
    entries: Vec<EntryPoint>,
}

impl StaticEntryPoints {
    /// Serve exactly `entries`
    pub fn new(entries: Vec<EntryPoint>) -> Self {
        Self { entries }
    }
}

impl EntryPointSource for StaticEntryPoints {
    fn entry_points(&self, group: &str) -> Result<Vec<EntryPoint>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.group == group)
            .copied()
            .collect())
    }
}

impl ProviderRegistry {
    /// Discover providers declared in this binary under `group`
    pub fn discover(&self, group: &str, raise_errors: bool) -> Result<Vec<String>> {
        self.discover_from(&LinkedEntryPoints, group, raise_errors)
    }

    /// Load and register every entry point `source` declares under `group`.
    ///
    /// Returns the names that were registered. Entries that fail to load, declare
    /// no name or collide with an existing registration are skipped and logged;
    /// with `raise_errors` they are reported together as
    /// [`TranslationError::DiscoveryError`] once every entry has been tried.
    /// Entries that succeeded stay registered either way.
    pub fn discover_from(
        &self,
        source: &dyn EntryPointSource,
        group: &str,
        raise_errors: bool,
    ) -> Result<Vec<String>> {
        let mut registered = Vec::new();

        let entries = match source.entry_points(group) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to get entry points for group {}: {}", group, e);
                if raise_errors {
                    return Err(TranslationError::EntryPointError {
                        message: e.to_string(),
                    });
                }
                return Ok(registered);
            }
        };

        let mut failures = Vec::new();
        for entry in entries {
            match self.register_entry(&entry) {
                Ok(name) => registered.push(name),
                Err(e) => {
                    error!("Failed to load provider {}: {}", entry.name, e);
                    failures.push(DiscoveryFailure {
                        entry_point: entry.name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Discovered {} provider(s) in group {} ({} failed)",
            registered.len(),
            group,
            failures.len()
        );

        if raise_errors && !failures.is_empty() {
            return Err(TranslationError::DiscoveryError { failures });
        }
        Ok(registered)
    }

    fn register_entry(&self, entry: &EntryPoint) -> Result<String> {
        let factory = (entry.load)()?;
        let name = factory.name().to_string();

        if name.trim().is_empty() {
            return Err(TranslationError::InvalidProviderName { name });
        }
        if name != entry.name {
            warn!(
                "Entry point {} declares provider name {}; registering as {}",
                entry.name, name, name
            );
        }

        self.register(name.clone(), factory)?;
        Ok(name)
    }
}

/// Discover providers into the global registry
pub fn discover_providers(group: &str, raise_errors: bool) -> Result<Vec<String>> {
    ProviderRegistry::global().discover(group, raise_errors)
}
