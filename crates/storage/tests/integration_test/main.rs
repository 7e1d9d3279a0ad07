//! Integration tests for skillboard-storage against the local backend.
