pub(crate) mod error;
pub(crate) mod path;
pub(crate) mod value;
