//! GF(2^128) Arithmetic for GHASH
//!
//! Multiplication by a fixed hash subkey H using Shoup's 4-bit table method,
//! with the reduction polynomial x^128 + x^7 + x^2 + x + 1 and the bit order
//! of NIST SP 800-38D §6.3 (bit 0 of byte 0 is the x^0 coefficient).

mod table;
mod tests;

pub use table::Gf128Table;
