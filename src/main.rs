use std::env;

use anyhow::Context;
use joint_car::{
    config::SceneConfig,
    ground::FileTextureSource,
    logging::init_logging,
    Scene, Variant,
};
use tracing::info;

/// Scripted key edges: (tick, code, pressed).
const SCRIPT: &[(u64, &str, bool)] = &[
    (30, "KeyW", true),
    (240, "KeyA", true),
    (360, "KeyA", false),
    (420, "KeyW", false),
    (480, "Space", true),
    (482, "Space", false),
];

fn main() -> anyhow::Result<()> {
    init_logging();

    let mut args = env::args().skip(1);
    let variant: Option<Variant> = args.next().map(|arg| arg.parse()).transpose()?;
    let mut config = match args.next() {
        Some(path) => SceneConfig::from_json_file(&path)?,
        None => SceneConfig::default(),
    };
    if let Some(variant) = variant {
        config.variant = variant;
    }
    let ticks: u64 = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid tick count {:?}", n))?,
        None => 600,
    };

    let mut scene = Scene::from_config(&config).context("unable to build scene")?;
    scene.load_ground(FileTextureSource::new("."), &config.ground);
    info!(variant = ?config.variant, ticks, "driving");

    for tick in 0..ticks {
        for &(at, code, pressed) in SCRIPT {
            if at == tick {
                if pressed {
                    scene.key_down(code);
                } else {
                    scene.key_up(code);
                }
            }
        }

        scene.tick()?;

        if tick % 60 == 0 {
            if let Some(pose) = scene.chassis_pose() {
                let t = pose.translation.vector;
                let (roll, pitch, yaw) = pose.rotation.euler_angles();
                info!(tick, x = t.x, y = t.y, z = t.z, roll, pitch, yaw, ground = scene.ground().is_some(), "chassis");
            }
        }
    }

    Ok(())
}
