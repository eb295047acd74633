pub mod room;
pub use room::*;

pub mod session;
pub use session::*;
