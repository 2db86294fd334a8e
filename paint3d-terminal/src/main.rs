/// Paint3D Terminal - OBJ mesh viewer
///
/// Renders meshes with the paint3d software pipeline into the terminal.
/// Controls:
///   - M / Space: Next render mode
///   - N / Tab: Next asset
///   - WASD / Arrow Keys: Rotate the mesh while held
///   - Q / Esc: Quit
///
/// Logs go to stderr; redirect it (`2>paint3d.log`) when raising `RUST_LOG`.
use clap::Parser;
use paint3d_core::RenderMode;
use paint3d_terminal::{AssetList, Config, TerminalApp};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Geometry files to cycle through, replacing the configured list
    assets: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial render mode: point-cloud, wireframe-full, wireframe-culled,
    /// solid or solid-shaded
    #[arg(short, long)]
    mode: Option<RenderMode>,

    /// Frame rate cap
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if !args.assets.is_empty() {
        config.assets = args.assets;
    }
    if let Some(mode) = args.mode {
        config.render.mode = mode;
    }
    if let Some(fps) = args.fps {
        config.render.target_fps = fps;
    }

    let mut assets = AssetList::new(config.assets.clone());
    let mesh = assets.load_first()?;

    let mut app = TerminalApp::new(&config, assets, mesh)?;
    app.run()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_mode_and_assets() {
        let args = Args::parse_from(["paint3d-terminal", "--mode", "wireframe-full", "a.obj", "b.obj"]);
        assert_eq!(args.mode, Some(RenderMode::WireframeFull));
        assert_eq!(args.assets, vec![PathBuf::from("a.obj"), PathBuf::from("b.obj")]);
        assert!(args.config.is_none());

        assert!(Args::try_parse_from(["paint3d-terminal", "--mode", "flat"]).is_err());
    }
}
