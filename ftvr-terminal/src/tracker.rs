/// Tracking sources available to the terminal host
use crossterm::event::KeyCode;
use ftvr_core::trace::PenSample;
use ftvr_core::{PointerPose, TraceReplay, TrackingSample, TrackingSource, ViewerPose};
use nalgebra::{Point3, Vector3};

/// Step applied per key press, in meters
const MOVE_STEP: f32 = 0.01;

/// Simulated tracker steered from the keyboard
#[derive(Debug, Clone)]
pub struct KeyboardTracker {
    glasses: Point3<f32>,
    pen: Point3<f32>,
    pen_direction: Vector3<f32>,
}

impl KeyboardTracker {
    /// Glasses at the nominal viewpoint, pen held in front of the screen
    pub fn new(screen_distance: f32) -> Self {
        Self {
            glasses: Point3::origin(),
            pen: Point3::new(0.05, -0.05, screen_distance * 0.6),
            pen_direction: Vector3::new(-0.2, 0.3, 1.0).normalize(),
        }
    }

    /// Apply a key to the simulated poses. Returns whether it was consumed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let (glasses, pen) = match code {
            KeyCode::Char('a') | KeyCode::Left => (Vector3::new(-MOVE_STEP, 0.0, 0.0), Vector3::zeros()),
            KeyCode::Char('d') | KeyCode::Right => (Vector3::new(MOVE_STEP, 0.0, 0.0), Vector3::zeros()),
            KeyCode::Char('w') | KeyCode::Up => (Vector3::new(0.0, MOVE_STEP, 0.0), Vector3::zeros()),
            KeyCode::Char('s') | KeyCode::Down => (Vector3::new(0.0, -MOVE_STEP, 0.0), Vector3::zeros()),
            KeyCode::Char('r') => (Vector3::new(0.0, 0.0, MOVE_STEP), Vector3::zeros()),
            KeyCode::Char('f') => (Vector3::new(0.0, 0.0, -MOVE_STEP), Vector3::zeros()),
            KeyCode::Char('j') => (Vector3::zeros(), Vector3::new(-MOVE_STEP, 0.0, 0.0)),
            KeyCode::Char('l') => (Vector3::zeros(), Vector3::new(MOVE_STEP, 0.0, 0.0)),
            KeyCode::Char('i') => (Vector3::zeros(), Vector3::new(0.0, MOVE_STEP, 0.0)),
            KeyCode::Char('k') => (Vector3::zeros(), Vector3::new(0.0, -MOVE_STEP, 0.0)),
            _ => return false,
        };
        self.glasses += glasses;
        self.pen += pen;
        true
    }
}

impl TrackingSource for KeyboardTracker {
    fn next_sample(&mut self) -> Option<TrackingSample> {
        Some(TrackingSample {
            glasses: ViewerPose {
                position: self.glasses,
                orientation: None,
            },
            pen: Some(PenSample {
                pose: PointerPose::new(self.pen, self.pen_direction),
                roll: 0.0,
            }),
        })
    }
}

/// Where the host gets its poses from
pub enum Tracker {
    Keyboard(KeyboardTracker),
    Replay(TraceReplay),
}

impl Tracker {
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self {
            Tracker::Keyboard(tracker) => tracker.handle_key(code),
            Tracker::Replay(_) => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tracker::Keyboard(_) => "keyboard",
            Tracker::Replay(_) => "replay",
        }
    }
}

impl TrackingSource for Tracker {
    fn next_sample(&mut self) -> Option<TrackingSample> {
        match self {
            Tracker::Keyboard(tracker) => tracker.next_sample(),
            Tracker::Replay(replay) => replay.next_sample(),
        }
    }
}
