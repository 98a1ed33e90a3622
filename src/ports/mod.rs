pub mod observation_port;
pub mod config_port;
