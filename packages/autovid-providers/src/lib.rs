pub mod duration;
pub mod youtube;

mod error;

pub use error::{Error, Result};
