/// Recorded tracking data: parser, loader and replay source
///
/// One sample per line:
///
/// ```text
/// # comment
/// glass 0 0 -0.4 rot 0 0 0 1 pen 0.1 0.1 -0.1 dir 0 0 -1 roll 0.2
/// ```
///
/// `rot`, the `pen ... dir ...` block and `roll` are optional.
use std::path::Path;

use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{space0, space1},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::preceded,
    IResult,
};
use thiserror::Error;

use crate::geometry::{PointerPose, ViewerPose};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: malformed sample `{text}`")]
    Malformed { line: usize, text: String },

    #[error("line {line}: rotation quaternion has zero length")]
    ZeroRotation { line: usize },

    #[error("trace contains no samples")]
    Empty,

    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
}

/// Stylus reading: pose plus the roll the pose cannot express
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenSample {
    pub pose: PointerPose,
    pub roll: f32,
}

/// One tracker reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSample {
    pub glasses: ViewerPose,
    /// `None` when the stylus was not detected
    pub pen: Option<PenSample>,
}

/// Source of per-frame tracking data
pub trait TrackingSource {
    /// Latest sample, or `None` once the source is exhausted.
    fn next_sample(&mut self) -> Option<TrackingSample>;
}

/// Plays back a parsed trace, optionally looping
#[derive(Debug, Clone)]
pub struct TraceReplay {
    samples: Vec<TrackingSample>,
    cursor: usize,
    looping: bool,
}

impl TraceReplay {
    pub fn new(samples: Vec<TrackingSample>, looping: bool) -> Result<Self, TraceError> {
        if samples.is_empty() {
            return Err(TraceError::Empty);
        }
        Ok(Self {
            samples,
            cursor: 0,
            looping,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl TrackingSource for TraceReplay {
    fn next_sample(&mut self) -> Option<TrackingSample> {
        if self.cursor == self.samples.len() {
            if !self.looping {
                return None;
            }
            self.cursor = 0;
        }
        let sample = self.samples[self.cursor];
        self.cursor += 1;
        Some(sample)
    }
}

/// Read and parse a trace file
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TrackingSample>, TraceError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let samples = parse_trace(&text)?;
    tracing::debug!(path = %path.display(), samples = samples.len(), "loaded tracking trace");
    Ok(samples)
}

/// Parse trace text, skipping blank lines and `#` comments
pub fn parse_trace(input: &str) -> Result<Vec<TrackingSample>, TraceError> {
    let mut samples = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let content = raw.split_once('#').map_or(raw, |(head, _)| head).trim();
        if content.is_empty() {
            continue;
        }

        let (_, record) = all_consuming(parse_record)(content).map_err(|_| TraceError::Malformed {
            line,
            text: content.to_string(),
        })?;

        let orientation = match record.rotation {
            Some(q) if q.norm() > f32::EPSILON => Some(UnitQuaternion::from_quaternion(q)),
            Some(_) => return Err(TraceError::ZeroRotation { line }),
            None => None,
        };

        samples.push(TrackingSample {
            glasses: ViewerPose {
                position: Point3::from(record.glasses),
                orientation,
            },
            pen: record.pen,
        });
    }

    Ok(samples)
}

struct Record {
    glasses: Vector3<f32>,
    rotation: Option<Quaternion<f32>>,
    pen: Option<PenSample>,
}

fn parse_record(input: &str) -> IResult<&str, Record> {
    let (input, _) = tag("glass")(input)?;
    let (input, glasses) = parse_vector3(input)?;
    let (input, rotation) = opt(parse_rotation)(input)?;
    let (input, pen) = opt(parse_pen)(input)?;
    let (input, _) = space0(input)?;

    Ok((
        input,
        Record {
            glasses,
            rotation,
            pen,
        },
    ))
}

fn parse_rotation(input: &str) -> IResult<&str, Quaternion<f32>> {
    let (input, _) = preceded(space1, tag("rot"))(input)?;
    let (input, v) = parse_vector3(input)?;
    let (input, w) = preceded(space1, float)(input)?;
    Ok((input, Quaternion::new(w, v.x, v.y, v.z)))
}

fn parse_pen(input: &str) -> IResult<&str, PenSample> {
    let (input, _) = preceded(space1, tag("pen"))(input)?;
    let (input, position) = parse_vector3(input)?;
    let (input, _) = preceded(space1, tag("dir"))(input)?;
    let (input, direction) = parse_vector3(input)?;
    let (input, roll) = opt(preceded(preceded(space1, tag("roll")), preceded(space1, float)))(input)?;

    Ok((
        input,
        PenSample {
            pose: PointerPose::new(Point3::from(position), direction),
            roll: roll.unwrap_or(0.0),
        },
    ))
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, x) = preceded(space1, float)(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    Ok((input, Vector3::new(x, y, z)))
}
