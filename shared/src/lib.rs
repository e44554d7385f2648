use serde::{Deserialize, Serialize};

mod wire;

pub use wire::{decode_server_message, encode_client_message, DecodeError, UpdateShapeError};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub p1: Point,
    pub p2: Point,
}

/// Axis-aligned extent of a polygon. On the wire this is the array
/// `[min_x, max_x, min_y, max_y]`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([min_x, max_x, min_y, max_y]: [f64; 4]) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y]
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Polygon {
    pub edges: Vec<Edge>,
    pub bounding_box: BoundingBox,
}

/// Two opposite corners, in whatever order the server reported them.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub p1: Point,
    pub p2: Point,
}

impl Rect {
    /// Returns the same rectangle with `p1` at the minimum corner and `p2` at
    /// the maximum corner.
    pub fn normalized(&self) -> Rect {
        Rect {
            p1: Point {
                x: self.p1.x.min(self.p2.x),
                y: self.p1.y.min(self.p2.y),
            },
            p2: Point {
                x: self.p1.x.max(self.p2.x),
                y: self.p1.y.max(self.p2.y),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub rect: Rect,
    pub is_contained: bool,
    pub area: f64,
}

/// Progress batch from the search. Both the batched `workers` shape and the
/// older single-worker shape decode into this; the latter becomes worker 0.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "wire::RawUpdate")]
pub struct Update {
    pub workers: Vec<WorkerReport>,
    pub current_best: f64,
    pub checked_count: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init { polygon: Polygon, max_cores: usize },
    #[serde(rename = "update")]
    Update(Update),
    #[serde(rename = "complete")]
    Complete {
        result: f64,
        #[serde(deserialize_with = "wire::count")]
        checked_count: u64,
    },
    #[serde(rename = "status")]
    Status { running: bool, paused: bool },
}

impl ServerMessage {
    pub const KINDS: [&'static str; 4] = ["init", "update", "complete", "status"];

    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Init { .. } => "init",
            ServerMessage::Update(_) => "update",
            ServerMessage::Complete { .. } => "complete",
            ServerMessage::Status { .. } => "status",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// `speed` is the per-candidate delay in microseconds.
    #[serde(rename = "start")]
    Start { speed: u64, num_cores: usize },
    #[serde(rename = "pause")]
    Pause,
    #[serde(rename = "resume")]
    Resume,
    #[serde(rename = "stop")]
    Stop,
    #[serde(rename = "set_speed")]
    SetSpeed { speed: u64 },
    #[serde(rename = "set_cores")]
    SetCores { num_cores: usize },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Start { .. } => "start",
            ClientMessage::Pause => "pause",
            ClientMessage::Resume => "resume",
            ClientMessage::Stop => "stop",
            ClientMessage::SetSpeed { .. } => "set_speed",
            ClientMessage::SetCores { .. } => "set_cores",
        }
    }
}
