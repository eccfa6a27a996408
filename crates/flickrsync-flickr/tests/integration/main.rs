//! Integration tests for flickrsync-flickr
//!
//! Uses wiremock to simulate the Flickr REST, upload and OAuth endpoints
//! and verifies end-to-end behavior of the client, the gateway and the
//! authorization flow.

mod common;

mod test_auth;
mod test_gateway;
