//! Integration Tests Module
//!
//! This module contains integration tests for Reportdeck. Tests cover the
//! chat service flow (message decoration, persistence, cancellation), the
//! strict structured-report stream end to end against the replay transport,
//! and report normalization of loosely shaped agent payloads.

// Chat service flow tests
mod chat_flow_test;

// Report normalization and coercion tests
mod normalizer_test;

// Strict structured-report stream tests
mod strict_stream_test;
