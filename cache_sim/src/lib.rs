pub mod address;
mod bin;
pub mod cache;
pub mod geometry;
pub mod sim;
pub mod trace;

#[cfg(feature = "stat")]
pub mod stat;
