//! Unit tests - Public API tests that need no running server
