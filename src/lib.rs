//! Okcash proof-of-work: the Ethash-variant memory-hard hash used to mine and
//! verify Okcash blocks.
//!
//! [`ethash`] holds the hashing engine (sizes, cache, dataset, mix loop,
//! difficulty check and the light/full handles). [`io`] persists the full
//! dataset as a DAG file that is reused across runs.

pub mod ethash;
pub mod io;

pub use ethash::{
    boundary_from_difficulty, check_difficulty, quick_check_difficulty, quick_hash, seedhash, EthashError,
    EthashResult, Full, FullNewError, FullOptions, Light, ReturnValue,
};
