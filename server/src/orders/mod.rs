//! Order domain
//!
//! The [`OrderEngine`] owns order creation, the custom-item flow and
//! the status lifecycle.

pub mod engine;

#[cfg(test)]
mod tests;

pub use engine::{CreateOrderRequest, CustomOrderRequest, OrderEngine};
