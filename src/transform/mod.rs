//! Local transforms over rows already in memory. None of these touch the network.

pub mod aggregate;
pub mod filter;
pub mod predicate;
pub mod sort;

pub use aggregate::{aggregate, average_by, sum_by, Reducer};
pub use filter::{contains, filter, search};
pub use predicate::Predicate;
pub use sort::{parse_order, parse_order_str, sort, sort_by_keys, SortDirection, SortKey};
