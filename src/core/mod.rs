pub mod classifier;
pub mod dna;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod genome;
pub mod io;
pub mod kmer;
pub mod locator;
pub mod model;
pub mod params;
pub mod precalc;
pub mod pwm;
pub mod result;
pub mod transcript;
