//! Annotation object model: documents, annotations and the typed nodes they are built from.

pub(crate) mod data;
pub(crate) mod filter;
pub(crate) mod marker;
pub(crate) mod method;
pub(crate) mod model;
pub(crate) mod target;
