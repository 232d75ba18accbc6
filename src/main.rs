//! Entry point for the **nichtwm** window manager.
//!
//! Loads the configuration, connects to `$DISPLAY`, resolves the key
//! bindings against the live keyboard and runs the event loop until the X
//! server goes away.

use log::{error, info, warn};
use nichtwm::bindings::BindingTable;
use nichtwm::config::Config;
use nichtwm::manager::WindowManager;
use nichtwm::spawn::ShellSpawner;
use nichtwm::x11::X11Server;
use std::path::{Path, PathBuf};

/// Resolve the config directory (`$XDG_CONFIG_HOME/nichtwm`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("nichtwm")
}

/// Value of `--config <path>` or `--config=<path>`, if given.
fn config_arg(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn load_from(path: &Path) -> Config {
    match Config::load(path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            error!("{}; using defaults", e);
            Config::default()
        }
    }
}

/// Load the config named on the command line, else the first existing
/// `config.yaml` / `config.json`, else compiled-in defaults.
fn load_config() -> Config {
    if let Some(path) = config_arg(std::env::args().skip(1)) {
        return load_from(&path);
    }
    let dir = config_dir();
    for name in ["config.yaml", "config.json"] {
        let path = dir.join(name);
        if path.exists() {
            return load_from(&path);
        }
    }
    warn!("no config file in {}, using defaults", dir.display());
    Config::default()
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();

    let server = match X11Server::connect(None) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to connect to the X server: {}", e);
            std::process::exit(1);
        }
    };

    let mapping = match server.keyboard_mapping() {
        Ok(m) => m,
        Err(e) => {
            error!("failed to read the keyboard mapping: {}", e);
            std::process::exit(1);
        }
    };
    let bindings = BindingTable::resolve(&config, &mapping);

    let mut wm = WindowManager::new(
        server,
        ShellSpawner::default(),
        config.workspaces,
        bindings,
    );
    if let Err(e) = wm.run() {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("nichtwm exited");
}
