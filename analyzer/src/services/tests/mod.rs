//! Tests for analyzer services against a mock HTTP server and temp directories
