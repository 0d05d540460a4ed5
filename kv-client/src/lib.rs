mod clerk;
mod lock;

pub use clerk::{Clerk, GetStatus, PutStatus};
pub use lock::Lock;
