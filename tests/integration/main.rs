//! Integration tests for the collector
//!
//! These tests use wiremock to stand in for the Twitter REST API and a
//! `ManualClock` so rate-limit suspensions complete instantly.

mod session_tests;
mod support;
