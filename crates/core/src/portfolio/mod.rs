//! Portfolio positions and their valuation into sync inputs.

mod portfolio_model;
mod valuation;

pub use portfolio_model::*;
pub use valuation::value_portfolio;
