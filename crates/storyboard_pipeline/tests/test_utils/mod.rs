//! Test utilities for pipeline tests.
//!
//! Provides a scripted generative backend and response fixtures.

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_backend;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_backend::{
    ImageHandler, JsonHandler, MockBackend, Phase, default_image, default_json, requested_scenes,
};
