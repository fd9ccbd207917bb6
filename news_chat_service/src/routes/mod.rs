mod chat;
mod health_check;
mod history;
mod session;

pub use chat::*;
pub use health_check::*;
pub use history::*;
pub use session::*;
