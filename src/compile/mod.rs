//! Compilation entry points: the annotation fold and its file-level wrappers.

pub(crate) mod io;
pub(crate) mod pipeline;
