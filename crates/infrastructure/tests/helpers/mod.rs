#![allow(dead_code)]
mod builders;
mod dns_server_mock;
mod mock_exchange;

pub use builders::{a_answer, query, DispatcherBuilder};
pub use dns_server_mock::{MockBehavior, MockDnsServer};
pub use mock_exchange::MockExchange;
