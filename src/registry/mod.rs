//! Capability registry: the server-declared description of platforms and
//! sites, loaded once per session.
//!
//! The wire payload is validated here, at the boundary: a malformed
//! declaration (blank names, a platform referencing an undeclared site)
//! rejects the whole load instead of surfacing as missing-field surprises
//! deep inside form code. After a successful load the registry is
//! immutable; every read before that is an explicit error.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use subdesk_api_types::GlobalConfResp;
use thiserror::Error;
use tracing::info;

use crate::domain::{DomainError, Platform, Site};
use crate::infra::{ApiError, ApiTransport};
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "registry";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("capability registry read before load")]
    NotLoaded,
    #[error("capability registry already loaded")]
    AlreadyLoaded,
    #[error("unknown platform `{name}`")]
    UnknownPlatform { name: String },
    #[error("unknown site `{name}`")]
    UnknownSite { name: String },
    #[error("malformed capability payload: {0}")]
    Malformed(#[from] DomainError),
    #[error("capability load failed: {0}")]
    Load(#[from] ApiError),
}

struct Snapshot {
    platforms: BTreeMap<String, Arc<Platform>>,
    sites: BTreeMap<String, Arc<Site>>,
}

impl Snapshot {
    fn from_wire(conf: &GlobalConfResp) -> Result<Self, RegistryError> {
        let mut sites = BTreeMap::new();
        for (name, site_conf) in &conf.site_conf {
            let site = Site::try_from(site_conf)?;
            if *name != site.name {
                return Err(DomainError::validation(format!(
                    "site key `{name}` disagrees with declared name `{}`",
                    site.name
                ))
                .into());
            }
            sites.insert(site.name.clone(), Arc::new(site));
        }

        let mut platforms = BTreeMap::new();
        for (name, platform_conf) in &conf.platform_conf {
            let platform = Platform::try_from(platform_conf)?;
            if *name != platform.platform_name {
                return Err(DomainError::validation(format!(
                    "platform key `{name}` disagrees with declared name `{}`",
                    platform.platform_name
                ))
                .into());
            }
            if !sites.contains_key(&platform.site_name) {
                return Err(DomainError::validation(format!(
                    "platform `{}` references undeclared site `{}`",
                    platform.platform_name, platform.site_name
                ))
                .into());
            }
            platforms.insert(platform.platform_name.clone(), Arc::new(platform));
        }

        Ok(Self { platforms, sites })
    }
}

/// Load-once lookup table for platform and site capabilities.
pub struct CapabilityRegistry {
    inner: RwLock<Option<Snapshot>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Fetch and install the capability payload. Exactly one load wins per
    /// session; later calls fail with `AlreadyLoaded` without refetching.
    pub async fn load(&self, transport: &dyn ApiTransport) -> Result<(), RegistryError> {
        if self.is_loaded() {
            return Err(RegistryError::AlreadyLoaded);
        }
        let conf = transport.global_conf().await?;
        self.install(&conf)
    }

    /// Validate and install a pre-fetched capability payload.
    pub fn install(&self, conf: &GlobalConfResp) -> Result<(), RegistryError> {
        let snapshot = Snapshot::from_wire(conf)?;
        let mut guard = rw_write(&self.inner, SOURCE, "install");
        if guard.is_some() {
            return Err(RegistryError::AlreadyLoaded);
        }
        info!(
            platforms = snapshot.platforms.len(),
            sites = snapshot.sites.len(),
            "Capability registry loaded"
        );
        *guard = Some(snapshot);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        rw_read(&self.inner, SOURCE, "is_loaded").is_some()
    }

    pub fn platform(&self, name: &str) -> Result<Arc<Platform>, RegistryError> {
        let guard = rw_read(&self.inner, SOURCE, "platform");
        let snapshot = guard.as_ref().ok_or(RegistryError::NotLoaded)?;
        snapshot
            .platforms
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownPlatform {
                name: name.to_string(),
            })
    }

    pub fn site(&self, name: &str) -> Result<Arc<Site>, RegistryError> {
        let guard = rw_read(&self.inner, SOURCE, "site");
        let snapshot = guard.as_ref().ok_or(RegistryError::NotLoaded)?;
        snapshot
            .sites
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownSite {
                name: name.to_string(),
            })
    }

    /// All declared platforms, in name order.
    pub fn platforms(&self) -> Result<Vec<Arc<Platform>>, RegistryError> {
        let guard = rw_read(&self.inner, SOURCE, "platforms");
        let snapshot = guard.as_ref().ok_or(RegistryError::NotLoaded)?;
        Ok(snapshot.platforms.values().cloned().collect())
    }

    /// All declared sites, in name order.
    pub fn sites(&self) -> Result<Vec<Arc<Site>>, RegistryError> {
        let guard = rw_read(&self.inner, SOURCE, "sites");
        let snapshot = guard.as_ref().ok_or(RegistryError::NotLoaded)?;
        Ok(snapshot.sites.values().cloned().collect())
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
