#![allow(dead_code)]

pub mod fixtures;
pub mod scripted;
pub mod socket_guard;
