pub mod render;
pub mod timerange;
