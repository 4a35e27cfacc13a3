//! Request and response payloads for the casapaz API.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
