#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod engine;
pub mod fx;
pub mod physical_modelling;
pub mod preset;
pub mod utils;
pub mod voice;
pub mod voice_manager;
