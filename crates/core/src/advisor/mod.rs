//! Advisor briefing: contract, validation, fallback and templated generation.

mod advisor_model;
mod briefing_generator;

pub use advisor_model::*;
pub use briefing_generator::{
    generate_briefing, infer_verdict, normalize_news, normalize_news_item, BriefingGenerator,
    TemplateBriefingGenerator,
};
