// src/lib.rs

pub mod config;
pub mod error;
pub mod field_state;
pub mod grid;
pub mod noise;
pub mod output;
pub mod params;
pub mod recorder;
pub mod simulation;
pub mod spectrum;
pub mod traveling_wave;
pub mod visualisation;
