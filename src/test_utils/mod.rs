//! Test utilities: in-memory provider mock, data factories, and an app
//! state builder for HTTP-level tests.

mod app_state_builder;
mod billing_mocks;
mod factories;

pub use app_state_builder::*;
pub use billing_mocks::*;
pub use factories::*;
