use std::env;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::pose::PoseCommand;

/// External tools found at start-up.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub pose: Option<PoseCommand>,
    pub ffprobe: Option<PathBuf>,
}

impl Capabilities {
    pub fn detect(config: &Config) -> Self {
        let pose = match &config.pose {
            Some(pose_config) => match resolve_program(&pose_config.command) {
                Some(program) => Some(PoseCommand::new(program, pose_config)),
                None => {
                    log::warn!(
                        "Pose command '{}' not found, pose analysis unavailable",
                        pose_config.command
                    );
                    None
                }
            },
            None => {
                log::info!("No pose command configured");
                None
            }
        };

        let ffprobe = resolve_program(&config.video.ffprobe);
        if ffprobe.is_none() {
            log::warn!(
                "'{}' not found, video metadata will use defaults",
                config.video.ffprobe
            );
        }

        Self { pose, ffprobe }
    }
}

/// Resolves a program name the way a shell would: paths are checked
/// directly, bare names are searched in `PATH`.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }

    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    })
}
