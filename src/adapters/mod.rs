//! Concrete adapter implementations for ports.

pub mod cached_data_adapter;
pub mod chart_svg;
pub mod console_report;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod html_report;
