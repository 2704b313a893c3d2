//! Base chart templates: normalize raw chart data and render the one-layer starting chart.

pub(crate) mod spec;
pub(crate) mod template;
