/// Terminal fish-tank VR host: tracked stereo pair rendered as ASCII
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use ftvr_core::trace::PenSample;
use ftvr_core::{pointer_orientation, Eye, FrameInput, FrustumResult, PointerPose, StereoRig, TrackingSource};
use nalgebra::UnitQuaternion;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod scene;
pub mod settings;
pub mod tracker;

pub use renderer::AsciiRenderer;
pub use scene::Scene;
pub use tracker::{KeyboardTracker, Tracker};

const PUPIL_DISTANCE_STEP: f32 = 0.002;
const POINTER_LENGTH: f32 = 0.1;
/// Rows reserved for the status lines
const HUD_ROWS: usize = 2;

/// Main application struct for the terminal host
pub struct TerminalApp {
    rig: StereoRig,
    tracker: Tracker,
    scene: Scene,
    renderer: AsciiRenderer,
    last_result: Option<FrustumResult>,
    last_pen: PenSample,
    status: Option<String>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(rig: StereoRig, tracker: Tracker) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(rig, tracker, width as usize, height as usize))
    }

    /// Host with a fixed character grid, independent of the terminal
    pub fn with_size(rig: StereoRig, tracker: Tracker, width: usize, height: usize) -> Self {
        let screen = rig.config().screen;
        Self {
            rig,
            tracker,
            scene: Scene::fish_tank(screen.distance, screen.height),
            renderer: AsciiRenderer::new(width, height.saturating_sub(HUD_ROWS).max(1)),
            last_result: None,
            last_pen: PenSample {
                pose: PointerPose::default(),
                roll: 0.0,
            },
            status: None,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn rig(&self) -> &StereoRig {
        &self.rig
    }

    /// Most recent frame that computed successfully
    pub fn last_result(&self) -> Option<&FrustumResult> {
        self.last_result.as_ref()
    }

    /// Full stylus orientation from the last pen sample, roll included
    pub fn pen_orientation(&self) -> Option<UnitQuaternion<f32>> {
        pointer_orientation(&self.last_pen.pose, &self.rig.config().basis, self.last_pen.roll)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                    if kind != KeyEventKind::Release {
                        self.handle_key(code);
                    }
                }
            }

            self.update(target_frame_time.as_secs_f32());
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('[') => self.adjust_pupil_distance(-PUPIL_DISTANCE_STEP),
            KeyCode::Char(']') => self.adjust_pupil_distance(PUPIL_DISTANCE_STEP),
            KeyCode::Char('h') => {
                let config = self.rig.config();
                let config = config.with_handedness(config.handedness.flipped());
                self.reconfigure(config);
            }
            code => {
                self.tracker.handle_key(code);
            }
        }
    }

    fn adjust_pupil_distance(&mut self, delta: f32) {
        let config = self.rig.config();
        let config = config.with_pupil_distance((config.pupil_distance + delta).max(0.0));
        self.reconfigure(config);
    }

    fn reconfigure(&mut self, config: ftvr_core::StereoConfig) {
        match StereoRig::new(config) {
            Ok(rig) => {
                tracing::info!(
                    pupil_distance = config.pupil_distance,
                    handedness = ?config.handedness,
                    "rig reconfigured"
                );
                self.rig = rig;
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), "rejected rig change");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Pull the next tracking sample and recompute both eyes.
    ///
    /// A rejected frame keeps the previous result on screen.
    pub fn update(&mut self, dt: f32) {
        self.scene.advance(dt);

        let Some(sample) = self.tracker.next_sample() else {
            tracing::info!("tracking source exhausted");
            self.running = false;
            return;
        };
        if let Some(pen) = sample.pen {
            self.last_pen = pen;
        }

        let input = FrameInput::new(sample.glasses, self.last_pen.pose);
        match self.rig.compute(&input) {
            Ok(result) => {
                self.last_result = Some(result);
                self.status = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), "frame rejected, keeping previous result");
                self.status = Some(format!("frame rejected: {e}"));
            }
        }
    }

    /// Rasterize the last good result into the character grid
    pub fn draw_frame(&mut self) -> &AsciiRenderer {
        self.renderer.clear();
        if let Some(result) = &self.last_result {
            let model = self.scene.model_matrix();
            for (eye, viewport) in Eye::BOTH.into_iter().zip(self.renderer.eye_viewports()) {
                let frame = result.eye(eye);
                self.renderer.render_mesh(viewport, &self.scene.mesh, &model, frame);
                self.renderer.render_pointer(viewport, frame, POINTER_LENGTH);
            }
        }
        &self.renderer
    }

    fn hud_line(&self) -> String {
        let config = self.rig.config();
        let viewer = match &self.last_result {
            Some(result) => {
                let midpoint = nalgebra::center(&result.left.position, &result.right.position);
                format!("({:+.3}, {:+.3}, {:+.3})", midpoint.x, midpoint.y, midpoint.z)
            }
            None => "--".to_string(),
        };
        let pen = match self.pen_orientation() {
            Some(orientation) => {
                let (roll, pitch, yaw) = orientation.euler_angles();
                format!(
                    "pen r/p/y {:+.0}/{:+.0}/{:+.0}",
                    roll.to_degrees(),
                    pitch.to_degrees(),
                    yaw.to_degrees()
                )
            }
            None => "pen --".to_string(),
        };
        format!(
            "FTVR | {} | viewer {} | {} | IPD {:.3} | {:?}-handed | FPS {:.1} | {}",
            self.tracker.label(),
            viewer,
            pen,
            config.pupil_distance,
            config.handedness,
            self.fps,
            self.status.as_deref().unwrap_or("ok"),
        )
    }

    fn render(&mut self) -> io::Result<()> {
        self.draw_frame();

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, HUD_ROWS as u16))?;
        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(self.hud_line()),
            cursor::MoveTo(0, 1),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::DarkGrey),
            Print("WASD/Arrows=Glasses R/F=Depth IJKL=Pen [/]=IPD H=Handedness Q=Quit"),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ftvr_core::{StereoConfig, TraceReplay, TrackingSample, ViewerPose};
    use nalgebra::Point3;

    fn rig() -> StereoRig {
        StereoRig::new(StereoConfig::default()).unwrap()
    }

    fn keyboard_app() -> TerminalApp {
        let tracker = Tracker::Keyboard(KeyboardTracker::new(0.6));
        TerminalApp::with_size(rig(), tracker, 81, 26)
    }

    #[test]
    fn test_update_produces_result() {
        let mut app = keyboard_app();
        app.update(0.03);
        let result = app.last_result().unwrap();
        assert!(result.is_finite());
        assert!(app.status().is_none());
    }

    #[test]
    fn test_rejected_frame_keeps_previous_result() {
        let good = TrackingSample {
            glasses: ViewerPose::default(),
            pen: None,
        };
        let bad = TrackingSample {
            glasses: ViewerPose {
                position: Point3::new(f32::NAN, 0.0, 0.0),
                orientation: None,
            },
            pen: None,
        };
        let replay = TraceReplay::new(vec![good, bad], false).unwrap();
        let mut app = TerminalApp::with_size(rig(), Tracker::Replay(replay), 81, 26);

        app.update(0.03);
        let first = *app.last_result().unwrap();
        app.update(0.03);

        assert_eq!(*app.last_result().unwrap(), first);
        assert!(app.status().unwrap().starts_with("frame rejected"));

        // Exhausted replay stops the host
        app.update(0.03);
        assert!(!app.is_running());
    }

    #[test]
    fn test_brackets_adjust_pupil_distance() {
        let mut app = keyboard_app();
        let before = app.rig().config().pupil_distance;
        app.handle_key(KeyCode::Char(']'));
        assert!(app.rig().config().pupil_distance > before);

        for _ in 0..100 {
            app.handle_key(KeyCode::Char('['));
        }
        assert_eq!(app.rig().config().pupil_distance, 0.0);
    }

    #[test]
    fn test_pen_roll_reaches_orientation() {
        let direction = nalgebra::Vector3::new(0.0, 0.3, 1.0).normalize();
        let sample = |roll: f32| TrackingSample {
            glasses: ViewerPose::default(),
            pen: Some(PenSample {
                pose: PointerPose::new(Point3::new(0.0, 0.0, 0.4), direction),
                roll,
            }),
        };
        let replay = TraceReplay::new(vec![sample(0.0), sample(0.5)], false).unwrap();
        let mut app = TerminalApp::with_size(rig(), Tracker::Replay(replay), 81, 26);

        app.update(0.0);
        let flat = app.pen_orientation().unwrap();
        app.update(0.0);
        let rolled = app.pen_orientation().unwrap();

        // Roll spins about the pen axis: the axis stays put, the frame turns
        let forward = app.rig().config().basis.forward;
        assert_relative_eq!(rolled * forward, direction, epsilon = 1e-5);
        assert_relative_eq!(flat.angle_to(&rolled), 0.5, epsilon = 1e-4);
        assert!(app.hud_line().contains("pen r/p/y"));
    }

    #[test]
    fn test_quit_key_stops_host() {
        let mut app = keyboard_app();
        app.handle_key(KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_draw_frame_fills_both_eyes() {
        let mut app = keyboard_app();
        app.update(0.0);
        let renderer = app.draw_frame();
        let [left, right] = renderer.eye_viewports();
        let row = left.height / 2;
        let covered = |x0: usize, width: usize| (x0..x0 + width).any(|x| renderer.cell(x, row) != ' ');
        assert!(covered(left.x, left.width));
        assert!(covered(right.x, right.width));
    }
}
