pub mod backends;
pub mod cli;
pub mod logging;
