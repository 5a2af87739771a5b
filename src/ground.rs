//! Ground plane that shows up once its texture has loaded.
//!
//! Loading runs on its own thread and is never waited on. The vehicle
//! simulates without ground until it arrives; if loading fails the ground
//! just never appears.

use std::{path::PathBuf, thread};

use anyhow::Context;
use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{info, warn};

use crate::backend::{BodyHandle, GroundDesc, PhysicsBackend};
use crate::config::GroundConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tiling across the ground plane.
    pub repeat: [u32; 2],
}

pub trait TextureSource: Send + 'static {
    fn load(&self, name: &str) -> anyhow::Result<Texture>;
}

impl<F> TextureSource for F
where
    F: Fn(&str) -> anyhow::Result<Texture> + Send + 'static,
{
    fn load(&self, name: &str) -> anyhow::Result<Texture> {
        self(name)
    }
}

/// Reads image headers from disk, relative to `root`.
pub struct FileTextureSource {
    root: PathBuf,
}

impl FileTextureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileTextureSource { root: root.into() }
    }
}

impl TextureSource for FileTextureSource {
    fn load(&self, name: &str) -> anyhow::Result<Texture> {
        let path = self.root.join(name);
        let (width, height) = image::image_dimensions(&path)
            .with_context(|| format!("unable to read texture {}", path.display()))?;
        Ok(Texture {
            name: name.to_owned(),
            width,
            height,
            repeat: [1, 1],
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundState {
    Pending,
    Ready(BodyHandle),
    /// Terminal. Nothing retries.
    Failed,
}

pub struct GroundLoad {
    rx: Option<Receiver<anyhow::Result<Texture>>>,
    desc: GroundDesc,
    repeat: [u32; 2],
    texture: Option<Texture>,
    state: GroundState,
}

impl GroundLoad {
    /// Starts loading `config.texture` in the background.
    pub fn spawn<S: TextureSource>(source: S, config: &GroundConfig) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let name = config.texture.clone();
        let spawned = thread::Builder::new()
            .name("texture-loader".to_owned())
            .spawn(move || {
                // receiver may already be gone with its scene
                let _ = tx.send(source.load(&name));
            });

        let (rx, state) = match spawned {
            Ok(_) => (Some(rx), GroundState::Pending),
            Err(e) => {
                warn!(error = %e, "unable to start texture loader, running without ground");
                (None, GroundState::Failed)
            }
        };

        GroundLoad {
            rx,
            desc: config.desc(),
            repeat: config.texture_repeat,
            texture: None,
            state,
        }
    }

    pub fn state(&self) -> GroundState {
        self.state
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Registers the ground the first time the texture is available.
    pub fn poll<B: PhysicsBackend>(&mut self, backend: &mut B) -> GroundState {
        if self.state != GroundState::Pending {
            return self.state;
        }
        let Some(rx) = &self.rx else {
            return self.state;
        };

        match rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                warn!("texture loader exited without a result, running without ground");
                self.fail();
            }
            Ok(Err(e)) => {
                warn!(error = %format!("{:#}", e), "ground texture failed to load, running without ground");
                self.fail();
            }
            Ok(Ok(mut texture)) => match backend.create_ground_plane(&self.desc) {
                Ok(handle) => {
                    texture.repeat = self.repeat;
                    info!(texture = %texture.name, %handle, "ground ready");
                    self.texture = Some(texture);
                    self.state = GroundState::Ready(handle);
                    self.rx = None;
                }
                Err(e) => {
                    warn!(error = %e, "ground plane rejected, running without ground");
                    self.fail();
                }
            },
        }
        self.state
    }

    fn fail(&mut self) {
        self.state = GroundState::Failed;
        self.rx = None;
    }
}
