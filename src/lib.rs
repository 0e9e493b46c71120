pub mod avatar;
pub mod client;
pub mod config;
pub mod create;
pub mod identity;
pub mod protocol;

pub use client::{LinkStatus, Session, SessionEvent};
pub use client::game::Phase;
