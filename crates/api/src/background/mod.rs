pub mod cache_sweep;
pub mod config_reload;
