// ABOUTME: API handler modules for the surgesense HTTP server.
// ABOUTME: One module per endpoint group.

pub mod surge;
