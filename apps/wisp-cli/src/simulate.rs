use glam::Vec3;
use serde::Serialize;
use std::time::Duration;
use wisp_avatar::{ManualClock, RenderHost};
use wisp_composer::{ComposeError, SceneContext, poll_assets};
use wisp_input::{InputEvent, Key};

/// Scripted input for a headless run.
#[derive(Debug, Clone)]
pub struct Script {
    pub frames: u32,
    pub frame_ms: f64,
    /// Frame at which the fast key goes down.
    pub fast_from: Option<u32>,
    /// Frame at which the fast key comes up.
    pub fast_to: Option<u32>,
    /// Hold the forward key for the whole run.
    pub forward: bool,
}

/// State after one simulated frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSample {
    pub frame: u32,
    pub t_ms: f64,
    pub speed_mode: String,
    pub speed: f32,
    pub camera: Vec3,
    pub wisp_offset: Vec3,
    pub roll: f64,
}

impl Script {
    fn events_at(&self, frame: u32, fast_key: Key, forward_key: Option<Key>) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if frame == 0 {
            if let (true, Some(key)) = (self.forward, forward_key) {
                events.push(InputEvent::KeyDown(key));
            }
        }
        if self.fast_from == Some(frame) {
            events.push(InputEvent::KeyDown(fast_key));
        }
        if self.fast_to == Some(frame) {
            events.push(InputEvent::KeyUp(fast_key));
        }
        events
    }
}

/// Drive the scene through `script` with a manual clock: inputs, camera
/// step, then the avatar update, once per frame.
pub fn run(
    ctx: &mut SceneContext,
    script: &Script,
    clock: &mut ManualClock,
) -> Result<Vec<FrameSample>, ComposeError> {
    let fast_key = ctx.player.config().fast_key;
    let forward_key = ctx.player.config().bindings.forward.first().copied();
    let dt_secs = (script.frame_ms / 1000.0) as f32;

    let mut samples = Vec::with_capacity(script.frames as usize);
    for frame in 0..script.frames {
        for event in script.events_at(frame, fast_key, forward_key) {
            ctx.handle_input(&event);
        }
        ctx.before_render(dt_secs)?;
        ctx.after_render(clock)?;

        let camera = ctx.player.camera();
        samples.push(FrameSample {
            frame,
            t_ms: clock.now_ms(),
            speed_mode: ctx.player.speed_mode().to_string(),
            speed: camera.speed,
            camera: camera.position,
            wisp_offset: ctx.player.wisp_offset(),
            roll: ctx.player.roll(),
        });
        clock.advance(script.frame_ms);
    }
    Ok(samples)
}

/// Block until queued model imports finish or `timeout` passes.
pub fn wait_for_models(ctx: &mut SceneContext, timeout: Duration) -> Result<usize, ComposeError> {
    let step = Duration::from_millis(10);
    let mut waited = Duration::ZERO;
    let mut added = poll_assets(ctx)?;
    while ctx.loader.pending() > 0 && waited < timeout {
        std::thread::sleep(step);
        waited += step;
        added += poll_assets(ctx)?;
    }
    if ctx.loader.pending() > 0 {
        tracing::warn!(pending = ctx.loader.pending(), "model imports still running");
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_avatar::Viewport;
    use wisp_composer::{SceneConfig, load_models, setup_environment};

    fn context() -> (tempfile::TempDir, SceneContext) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SceneConfig::default();
        config.assets.root = dir.path().into();
        let ctx = setup_environment(config, Viewport::new(640, 480)).unwrap();
        (dir, ctx)
    }

    fn script(frames: u32) -> Script {
        Script {
            frames,
            frame_ms: 1000.0 / 60.0,
            fast_from: None,
            fast_to: None,
            forward: false,
        }
    }

    #[test]
    fn fast_window_toggles_speed() {
        let (_dir, mut ctx) = context();
        let s = Script {
            fast_from: Some(2),
            fast_to: Some(4),
            ..script(6)
        };
        let samples = run(&mut ctx, &s, &mut ManualClock::new()).unwrap();
        let speeds: Vec<f32> = samples.iter().map(|s| s.speed).collect();
        assert_eq!(speeds, vec![0.5, 0.5, 2.0, 2.0, 0.5, 0.5]);
        let modes: Vec<&str> = samples.iter().map(|s| s.speed_mode.as_str()).collect();
        assert_eq!(modes, vec!["normal", "normal", "fast", "fast", "normal", "normal"]);
    }

    #[test]
    fn roll_grows_per_frame() {
        let (_dir, mut ctx) = context();
        let samples = run(&mut ctx, &script(10), &mut ManualClock::new()).unwrap();
        assert!((samples[9].roll - 10.0 * 0.002).abs() < 1e-12);
        assert_eq!(samples[0].wisp_offset, Vec3::new(0.0, -2.5, 10.0));
        assert_eq!(samples[0].t_ms, 0.0);
    }

    #[test]
    fn forward_moves_along_z() {
        let (_dir, mut ctx) = context();
        let s = Script {
            forward: true,
            ..script(4)
        };
        let samples = run(&mut ctx, &s, &mut ManualClock::new()).unwrap();
        let travelled = samples[3].camera.z - (-20.0);
        assert!((travelled - 4.0 * 0.5).abs() < 1e-3);
    }

    #[test]
    fn missing_model_wait_returns() {
        let (_dir, mut ctx) = context();
        load_models(&mut ctx).unwrap();
        let added = wait_for_models(&mut ctx, Duration::from_secs(5)).unwrap();
        assert_eq!(added, 0);
        assert_eq!(ctx.loader.pending(), 0);
    }
}
