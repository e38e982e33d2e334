//! Domain records shared by the flows, the CLI and the preview.

mod data_uri;
mod types;

pub use data_uri::{DataUri, DataUriError};
pub use types::*;
