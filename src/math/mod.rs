//! Screen-space math utilities

pub mod rect;

pub use rect::ScreenRect;
