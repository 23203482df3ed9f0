pub mod logger;
pub mod timing;

pub use logger::Logger;
pub use timing::sleep;
