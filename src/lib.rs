#![allow(dead_code)]

pub mod catalog;
pub mod external;
pub mod filter;
pub mod session;
pub mod ui;
