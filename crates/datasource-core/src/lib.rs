#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! datasource-core
//!
//! The contract external content providers implement to plug into a search
//! aggregation host: the [`DataSource`] capability and the records that cross
//! it ([`Topic`], [`DataItem`], [`SearchContext`]).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod validate;

#[cfg(feature = "testing")]
pub mod testing;

pub use error::{Error, Result};
pub use traits::DataSource;
pub use types::{DataItem, ItemId, SearchContext, Topic, TopicId};
