//! Upstream server addresses and per-request server selection.
mod address_book;
mod address_list;

pub use address_book::{AddressBook, ServerSelection};
pub use address_list::{AddressList, AddressSet};
