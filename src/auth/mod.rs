//! API token authentication
//!
//! The Tracker API authenticates with a personal API token sent in the
//! `X-TrackerToken` request header (not a Bearer scheme).

mod authenticator;

pub use authenticator::{TokenAuthenticator, TOKEN_HEADER};
