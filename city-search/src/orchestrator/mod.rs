//! Search orchestrator: dual-query fan-out, dedup, rank fusion, assembly.
//!
//! This module sends the normalised and transliterated query (sharing one
//! embedding) to the search engine, merges hits by location id keeping the
//! best evidence per signal, fuses the signals into one score, and orders
//! the canonical records fetched from the location store.

pub mod assemble;
pub mod dedup;
pub mod fanout;
pub mod fusion;
pub mod search;
