//! Interactive session: live parameters and the frame loop that consumes them.

pub mod store;
pub mod studio;
