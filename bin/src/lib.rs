pub mod app;
pub mod banner;
pub mod cli;
mod signals;

pub use app::run;
pub use cli::Cli;
