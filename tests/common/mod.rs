//! Common utilities for integration tests

#![allow(unused_imports)]

pub mod test_helpers;

// Re-export commonly used items
pub use test_helpers::{
    assert_fields_close,
    gaussian_field,
    heat_solver,
    max_difference,
    relative_error,
    wave_solver,
};
