//! GHASH Universal Hash
//!
//! Folds associated data and ciphertext into a 128-bit digest using a
//! precomputed [`Gf128Table`](crate::gf128::Gf128Table), and derives the
//! initial counter block from an IV of any length.

mod ghash;

pub use ghash::{
    calculate_civ,
    calculate_civ_general,
    calculate_ghash,
    GHashAccumulator,
    FAST_PATH_IV_SIZE,
};
