//! Static fixture data used as the fallback source.
//!
//! Fixtures are the JSON exports the front end shipped with. They are
//! compiled into the crate, and a directory of `<resource>.json` files
//! can be used instead to serve a different snapshot.

pub mod source;

pub use source::{filter_rows, parse_fixture, FixtureSource};
