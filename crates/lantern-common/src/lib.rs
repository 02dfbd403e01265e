//! Common plumbing for the Lantern crates.
//!
//! This crate provides the collaborators the CSS pipeline consumes at its
//! boundary:
//! - **Network** - retrieving the bytes of a stylesheet referenced by URL
//! - **URL resolution** - computing absolute import targets and cache keys

pub mod net;
pub mod url;

pub use net::{DefaultNetworkProcessor, FetchError, Fetched, NetworkProcessor};
pub use self::url::{DefaultUrlResolver, UrlError, UrlResolver};
