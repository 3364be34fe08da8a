//! Feedback on submitted queries: result grading and error hints.

pub mod error_hints;
pub mod similarity;
pub mod validator;

pub use error_hints::*;
pub use similarity::*;
pub use validator::*;
