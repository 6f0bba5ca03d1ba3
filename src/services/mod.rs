pub mod aggregator;
pub mod chart_view;
pub mod drag;
pub mod hierarchy;
pub mod row_parser;
pub mod row_source;
