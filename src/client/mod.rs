pub mod connection;
pub mod error;
pub mod params;

pub use connection::{ClustoClient, RawResponse, AUTH_ENV, URL_ENV};
pub use error::{ClustoError, Result};
pub use params::{ActionArgs, ArgValue, EntityQuery};
