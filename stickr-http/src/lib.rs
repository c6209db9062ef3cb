#![forbid(unsafe_code)]

mod client;
mod error;
mod types;
mod util;

pub use client::{ClientOptions, HttpClient};
pub use error::{Error, Result, TransportErrorKind};
pub use types::{HttpRequest, HttpResponse};
pub use util::header_values;
