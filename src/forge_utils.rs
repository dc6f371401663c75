pub mod common;
pub mod verify;

pub use common::ContractSpec;
pub use verify::ForgeVerify;
