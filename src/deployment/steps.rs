pub mod assemble_report;
pub mod deploy_contract;
pub mod record_address;
pub mod verify;
