mod scheduler;
pub mod utils;
