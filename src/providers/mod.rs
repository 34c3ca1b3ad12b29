pub mod bls;

pub use bls::BlsProvider;
