mod actions;
mod app;
mod dom;
mod fabric;
mod net;
mod sink;
mod util;
mod ws;

pub use app::run;
