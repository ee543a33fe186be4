use ferrous_forwarder_domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListReloadOutcome {
    Unchanged,
    Reloaded { entries: usize },
}

/// A domain list backed by a file that is periodically rebuilt and swapped in.
pub trait ListReloadPort: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn reload_if_changed(&self) -> Result<ListReloadOutcome, DomainError>;
}
