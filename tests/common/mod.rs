//! Integration test common infrastructure.
//!
//! Provides a handle on a spawned `nuitbot` process and in-process mock
//! peers for the chat, control-plane and local plugin sockets.

#![allow(dead_code)]

pub mod bot;
pub mod peers;

#[allow(unused_imports)]
pub use bot::TestBot;
#[allow(unused_imports)]
pub use peers::{MockChat, MockControl, MockLocal};
