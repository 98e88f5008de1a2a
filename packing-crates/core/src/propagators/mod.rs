//! Contains the propagators of this library.
pub mod bin_packing;
