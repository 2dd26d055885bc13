//! End-to-end tests of the library API.

mod common;
mod session_tests;
