//! Look up WAL airdrop objects owned by a Sui address or SuiNS name.
//!
//! Pipeline per request: [`resolver`] -> [`query`] -> [`presenter`], driven by
//! [`search::Explorer`].

pub mod api;
pub mod config;
pub mod distribution;
pub mod error;
pub mod identifier;
pub mod presenter;
pub mod query;
pub mod resolver;
pub mod rpc;
pub mod search;
pub mod version;

pub use config::ExplorerConfig;
pub use error::{ExplorerError, InputError, QueryError, ResolutionError};
pub use identifier::{CanonicalAddress, Identifier, TypeFilter};
pub use presenter::{AirdropRecord, Presenter};
pub use search::{Explorer, RequestContext, RequestTracker, SearchReport};
