//! # Marcus Core
//!
//! Search state, query parameters and Elasticsearch request construction for
//! the Marcus search gateway. Nothing here performs network I/O.
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Errors caused by request
//! parameters report `true` from [`Error::is_client_error`].

pub mod aggregations;
pub mod date_range;
pub mod discover;
mod error;
pub mod filters;
pub mod fuzzify;
pub mod params;
pub mod query;
pub mod query_params;
pub mod request;
mod result;
pub mod service;
pub mod settings;
pub mod sort;
pub mod state;
pub mod suggest;

pub use aggregations::AggregationSpec;
pub use date_range::DateRange;
pub use discover::DiscoverRequest;
pub use error::Error;
pub use filters::{FilterMap, build_filter_map};
pub use fuzzify::{FuzzyMode, fuzzify};
pub use query_params::QueryParams;
pub use request::SearchRequest;
pub use result::{Result, ResultExt};
pub use service::ServiceName;
pub use settings::{SearchSettings, Settings};
pub use sort::SortSpec;
pub use state::{SearchSession, SearchState, SearchTicket};
pub use suggest::{SuggestRequest, extract_suggestions};
