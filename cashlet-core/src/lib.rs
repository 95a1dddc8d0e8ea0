pub mod amount;
pub mod blind;
pub mod dhke;
pub mod error;
pub mod fixture;
pub mod keyset;
pub mod primitives;
pub mod proof;
pub mod token;
