//! Cache module - The two cache tiers in front of the generator
//!
//! Provides:
//! - Device-local cache (`.receita/storage.json`)
//! - Shared cache keyed by calendar date (Supabase table)

pub mod local;
pub mod shared;
