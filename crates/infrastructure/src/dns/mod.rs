pub mod cache;
pub mod dispatch;
pub mod filters;
pub mod hosts;
pub mod matcher;
pub mod transport;
pub mod upstream;
pub mod watched_file;
pub mod wire;

pub use cache::{RecordCache, RecordCacheOptions, SharedRecordCache};
pub use dispatch::{DnsDispatcher, ProtocolPolicy, QueryContext};
pub use filters::{BlockedIpSet, DomainFilters};
pub use hosts::{HostsMatch, HostsProvider};
pub use matcher::DomainMatcher;
pub use transport::{ResponseValidator, SocketExchange, UpstreamExchange, UpstreamSession};
pub use upstream::{AddressBook, ServerSelection};
pub use watched_file::WatchedFile;
