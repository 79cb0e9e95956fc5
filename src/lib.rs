pub mod argsets;
pub mod command;
pub mod constants;
pub mod data_mgmt;
pub mod device_mgmt;
pub mod helpers;
pub mod interfaces;
pub mod settings;
