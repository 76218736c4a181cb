#![deny(unused_must_use)]
// Don't allow dbg! prints in release.
#![cfg_attr(not(debug_assertions), deny(clippy::dbg_macro))]

#[macro_use]
extern crate num_derive;

pub use attribute::facade::{AttributeBinding, AttributeFacade};
pub use attribute::value::AttributeValue;
pub use attribute::{MftAttribute, MftAttributeType};
pub use device::{open_file, ReadSeek};
pub use err::{Error, Result};
pub use orchestrator::ReadFlags;
pub use stream::ClusterGeometry;

pub mod attribute;
pub mod cache;
pub mod device;
pub mod err;
pub mod orchestrator;
pub mod stream;

#[cfg(feature = "lznt1")]
pub(crate) mod lznt1;

pub(crate) mod macros;
pub(crate) mod utils;
