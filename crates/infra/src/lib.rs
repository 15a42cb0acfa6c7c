//! Infrastructure layer: adapters that put real models behind the
//! classification capability boundary.

pub mod ai;
