pub(crate) mod chart;
pub(crate) mod encoding;
pub(crate) mod field_info;
pub(crate) mod layer;
pub(crate) mod transform;
