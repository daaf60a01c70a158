#![allow(dead_code)]

pub mod faulty_store;
pub mod harness;
pub mod strategies;

pub use faulty_store::*;
pub use harness::*;
pub use strategies::*;
