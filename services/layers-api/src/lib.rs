//! Map layer catalog and NSPD search API.
//!
//! Merges three layer sources into one catalog — the layer store, static
//! `*.geojson` files discovered on disk, and four virtual layers backed by
//! NSPD thematic-search categories — and resolves a layer's data by its
//! composite identifier scheme (numeric store ids, `static_*`, `nspd_*`).

pub mod catalog;
pub mod handlers;
pub mod state;
pub mod store;
