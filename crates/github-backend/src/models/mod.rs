pub mod comment;
pub mod issue;
pub mod label;

pub use comment::*;
pub use issue::*;
pub use label::*;
