//! Headless deferred lighting demo
//!
//! Builds the orbiting light field over the ground plane, drives it with a
//! scripted input session on the recording backend and logs frame statistics.
//!
//! Usage: `lights_demo [config.toml|config.ron]`

use deferred_engine::foundation::logging;
use deferred_engine::foundation::time::FrameTimer;
use deferred_engine::prelude::*;

/// Frames between two statistics lines
const STATS_INTERVAL: u64 = 30;

/// Upper bound on frames, in case the script never requests exit
const MAX_FRAMES: u64 = 1_000;

struct LightsDemo {
    scene: DeferredScene,
    backend: RecordingBackend,
    input: ScriptedInput,
    timer: FrameTimer,
}

impl LightsDemo {
    fn new(config: &DeferredConfig) -> Result<Self, RenderError> {
        let mut backend = RecordingBackend::default();
        let assets = SceneAssets::placeholder(&mut backend)?;
        let scene = DeferredScene::new(config, assets, &mut backend)?;
        let input = scripted_session(&scene.context());

        Ok(Self {
            scene,
            backend,
            input,
            timer: FrameTimer::new(),
        })
    }

    fn run(&mut self) -> Result<(), RenderError> {
        log::info!("Running scripted session ({} input frames)", self.input.pending());

        while !self.scene.should_exit() && self.timer.frame_count() < MAX_FRAMES {
            let dt = self.timer.tick();
            self.scene.update(dt, &mut self.input, &mut self.backend)?;
            let stats = self.scene.draw(dt, &mut self.backend)?;

            if self.timer.frame_count() % STATS_INTERVAL == 0 {
                log::info!(
                    "frame {}: {:.3} ms ({:.0} fps), {}/{} lights visible, {} draws",
                    self.timer.frame_count(),
                    stats.frame_time * 1000.0,
                    stats.fps,
                    stats.visible_lights,
                    stats.registered_lights,
                    self.backend.draw_count()
                );
            }
            self.backend.clear_log();
        }

        log::info!(
            "Session finished after {} frames, average {:.0} fps, {} lights",
            self.timer.frame_count(),
            self.timer.average_fps(),
            self.scene.light_count()
        );
        Ok(())
    }
}

/// Walk forward, look around, exercise every toggle, then exit
fn scripted_session(context: &ScreenContext) -> ScriptedInput {
    let mut input = ScriptedInput::centered(context);
    for _ in 0..40 {
        input.push_keys(InputKeys::FORWARD);
    }
    for _ in 0..20 {
        input.push_keys(InputKeys::FORWARD | InputKeys::RIGHT | InputKeys::SPRINT);
    }
    for step in 0..30 {
        input.push_mouse(Vec2::new(4.0, if step % 2 == 0 { 1.0 } else { -1.0 }));
    }
    input.tap(InputKeys::MORE_LIGHTS);
    input.tap(InputKeys::TOGGLE_DEBUG_TARGETS);
    for _ in 0..30 {
        input.push_keys(InputKeys::UP);
    }
    input.tap(InputKeys::CYCLE_RESOLUTION);
    input.tap(InputKeys::TOGGLE_DEBUG_TARGETS);
    input.tap(InputKeys::FEWER_LIGHTS);
    input.tap(InputKeys::FEWER_LIGHTS);
    input.tap(InputKeys::TOGGLE_VSYNC);
    input.tap(InputKeys::RESET_CAMERA);
    for _ in 0..30 {
        input.push_keys(InputKeys::BACK | InputKeys::DOWN);
    }
    input.tap(InputKeys::EXIT);
    input
}

fn load_config() -> Result<DeferredConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => DeferredConfig::load_from_file(&path),
        None => Ok(DeferredConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_filter(&config.log_filter);

    log::info!("Starting deferred lights demo");
    let mut demo = LightsDemo::new(&config)?;
    demo.run()?;
    Ok(())
}
