//! Dashboard JSON generated from the synchronized workbook.

mod builder;
mod dashboard_model;
mod performance;

pub use builder::{
    build_dashboard, format_money, insights_from, read_dashboard_holdings, write_dashboard,
};
pub use dashboard_model::*;
pub use performance::{compute_performance, format_percent, nav_change};
