pub mod contact;
pub mod contact_synth;
pub mod debug_log;
pub mod optimized_params;
pub mod population;
pub mod run_config;
