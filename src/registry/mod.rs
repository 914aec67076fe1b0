//! Response Registry
//!
//! Maps a method name to the builder that answers it.
//!
//! ## Design
//! - Built once at startup through `RegistryBuilder`, immutable afterwards
//! - Shared with every connection handler behind an `Arc`
//! - Lookup is an exact, case-sensitive match

mod builders;
mod table;

pub use builders::{Echo, HtmlGreeting, ResponseBuilder, Time, GREETING_HTML, SERVER_NAME};
pub use table::{Registry, RegistryBuilder};
