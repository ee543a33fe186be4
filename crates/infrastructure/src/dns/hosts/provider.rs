use super::container::{HostsContainer, HostsMatch};
use crate::dns::watched_file::WatchedFile;
use arc_swap::ArcSwap;
use ferrous_forwarder_application::ports::{ListReloadOutcome, ListReloadPort};
use ferrous_forwarder_domain::{DomainError, HostsConfig, RecordType};
use std::sync::Arc;
use tracing::info;

/// Hosts overrides: the inline `append_hosts` layer, consulted first, and a
/// hot-reloaded file layer.
pub struct HostsProvider {
    static_layer: HostsContainer,
    file_layer: ArcSwap<HostsContainer>,
    file: Option<WatchedFile>,
}

impl HostsProvider {
    pub fn from_config(config: &HostsConfig) -> Result<Self, DomainError> {
        let static_layer =
            HostsContainer::from_lines(config.append_hosts.iter().map(String::as_str))?;
        Ok(Self {
            static_layer,
            file_layer: ArcSwap::from_pointee(HostsContainer::new()),
            file: config.file.as_ref().map(WatchedFile::new),
        })
    }

    pub fn empty() -> Self {
        Self {
            static_layer: HostsContainer::new(),
            file_layer: ArcSwap::from_pointee(HostsContainer::new()),
            file: None,
        }
    }

    pub fn lookup(&self, name: &str, rtype: RecordType) -> HostsMatch {
        match self.static_layer.lookup(name, rtype) {
            HostsMatch::None => self.file_layer.load().lookup(name, rtype),
            found => found,
        }
    }

    pub fn len(&self) -> usize {
        self.static_layer.len() + self.file_layer.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ListReloadPort for HostsProvider {
    fn name(&self) -> &str {
        "hosts"
    }

    fn reload_if_changed(&self) -> Result<ListReloadOutcome, DomainError> {
        let Some(file) = &self.file else {
            return Ok(ListReloadOutcome::Unchanged);
        };
        let Some(stamp) = file.changed_since_load()? else {
            return Ok(ListReloadOutcome::Unchanged);
        };

        let text = std::fs::read_to_string(file.path())?;
        let container = HostsContainer::from_lines(text.lines())?;
        let entries = container.len();
        self.file_layer.store(Arc::new(container));
        file.mark_loaded(stamp);

        info!(path = %file.path().display(), entries, "Hosts file loaded");
        Ok(ListReloadOutcome::Reloaded { entries })
    }
}
