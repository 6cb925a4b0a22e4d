pub mod angles;
pub mod constants;
pub(crate) mod embedded;
pub mod logging;
pub mod parsing;
