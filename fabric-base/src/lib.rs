mod error;
mod logging;

pub use error::{err, Error, Result};
pub use logging::init as init_logging;
