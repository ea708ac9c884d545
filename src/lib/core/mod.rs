pub mod error;
pub mod response;
pub mod todo;

pub use error::*;
pub use response::*;
pub use todo::*;
