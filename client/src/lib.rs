//! Browser client that watches a parallel largest-rectangle search: one
//! canvas per worker, fed by a websocket from the search server.

mod actions;
mod app;
mod config;
mod dom;
mod error;
mod geometry;
mod layout;
mod message_log;
mod net;
mod render;
mod scheduler;
mod speed;
mod state;
mod surfaces;
mod util;
mod ws;

pub use app::run;
