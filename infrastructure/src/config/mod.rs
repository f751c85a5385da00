//! Configuration loading — `figment`-backed TOML + environment overlay.
//!
//! Priority order, lowest to highest:
//! 1. Built-in defaults (each domain config's `Default` impl)
//! 2. Project config file (`./maoc.toml` or `./.maoc.toml`, project root wins
//!    if both exist)
//! 3. An explicit `--config` path, if supplied
//! 4. Environment variables prefixed `MAOC_` (e.g. `MAOC_CREW.MAX_CONCURRENT_TASKS`)
//!
//! There is no XDG global config directory here — this core has no
//! per-user installation story, so that layer is simply absent.

mod file_config;
mod loader;

pub use file_config::OrchestrationConfig;
pub use loader::ConfigLoader;
