use super::gfw_list::load_gfw_list;
use crate::dns::matcher::DomainMatcher;
use crate::dns::watched_file::WatchedFile;
use arc_swap::ArcSwap;
use ferrous_forwarder_application::ports::{ListReloadOutcome, ListReloadPort};
use ferrous_forwarder_domain::{DomainError, FilteringConfig, RecordType};
use std::sync::Arc;
use tracing::{info, warn};

struct GfwSource {
    file: WatchedFile,
    base64: bool,
}

/// Administrative domain policy: refused types and domains, and the
/// excluded set that is always resolved over the secondary protocol.
///
/// The excluded set is rebuilt from the configured names plus the GFW list
/// and published with a pointer swap; readers never see a partial list.
pub struct DomainFilters {
    disabled_types: Vec<u16>,
    disabled_domains: DomainMatcher,
    static_excluded: Vec<String>,
    excluded: ArcSwap<DomainMatcher>,
    gfw: Option<GfwSource>,
    refusing_response_code: u8,
}

impl DomainFilters {
    pub fn from_config(config: &FilteringConfig) -> Result<Self, DomainError> {
        let mut disabled_domains = DomainMatcher::with_capacity(config.disabled_domains.len());
        for domain in &config.disabled_domains {
            disabled_domains.add_unique(domain, None)?;
        }

        let filters = Self {
            disabled_types: config.disabled_types.clone(),
            disabled_domains,
            static_excluded: config.excluded_domains.clone(),
            excluded: ArcSwap::from_pointee(DomainMatcher::new()),
            gfw: config.gfw_list.as_ref().map(|path| GfwSource {
                file: WatchedFile::new(path),
                base64: config.gfw_list_base64_decode,
            }),
            refusing_response_code: config.refusing_response_code,
        };

        let excluded = filters.build_excluded(&[])?;
        filters.excluded.store(Arc::new(excluded));
        Ok(filters)
    }

    fn build_excluded(&self, gfw_domains: &[String]) -> Result<DomainMatcher, DomainError> {
        let mut matcher =
            DomainMatcher::with_capacity(self.static_excluded.len() + gfw_domains.len());
        for domain in self.static_excluded.iter().chain(gfw_domains) {
            matcher.add_unique(domain, None)?;
        }
        Ok(matcher)
    }

    pub fn is_type_disabled(&self, rtype: RecordType) -> bool {
        self.disabled_types.contains(&rtype.to_u16())
    }

    pub fn is_domain_disabled(&self, name: &str) -> bool {
        self.disabled_domains.matches_with_parents(name)
    }

    /// True if `name` or one of its parent zones is excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.load().matches_with_parents(name)
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.load().len()
    }

    pub fn refusing_response_code(&self) -> u8 {
        self.refusing_response_code
    }

    pub fn has_gfw_list(&self) -> bool {
        self.gfw.is_some()
    }
}

impl ListReloadPort for DomainFilters {
    fn name(&self) -> &str {
        "gfw-list"
    }

    fn reload_if_changed(&self) -> Result<ListReloadOutcome, DomainError> {
        let Some(gfw) = &self.gfw else {
            return Ok(ListReloadOutcome::Unchanged);
        };
        let Some(stamp) = gfw.file.changed_since_load()? else {
            return Ok(ListReloadOutcome::Unchanged);
        };

        let domains = load_gfw_list(gfw.file.path(), gfw.base64).inspect_err(|e| {
            warn!(path = %gfw.file.path().display(), error = %e, "Failed to read GFW list");
        })?;
        let matcher = self.build_excluded(&domains)?;
        let entries = matcher.len();
        self.excluded.store(Arc::new(matcher));
        gfw.file.mark_loaded(stamp);

        info!(
            path = %gfw.file.path().display(),
            gfw_entries = domains.len(),
            entries,
            "Excluded domain list rebuilt"
        );
        Ok(ListReloadOutcome::Reloaded { entries })
    }
}
