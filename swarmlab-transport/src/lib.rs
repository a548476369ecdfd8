use bytes::{BufMut, BytesMut};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use swarmlab_core::{EntityId, Quat, TransformSink, Vec3};
use thiserror::Error;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// --- Frames ---

/// Transform of one entity at the end of a tick.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub position: Vec3,
    pub orientation: Quat,
}

/// Everything the swarm reported during one tick.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub tick: u64,
    /// Simulated seconds since the swarm started.
    pub time: f64,
    pub entities: Vec<EntityRecord>,
}

/// Render sink that records transforms into frames instead of drawing them.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pending: Vec<EntityRecord>,
    completed: Option<Frame>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the most recently completed frame, if any.
    pub fn take(&mut self) -> Option<Frame> {
        self.completed.take()
    }
}

impl TransformSink for FrameRecorder {
    fn update_transform(&mut self, entity: EntityId, position: Vec3, orientation: Quat) {
        self.pending.push(EntityRecord {
            id: entity,
            position,
            orientation,
        });
    }

    fn end_tick(&mut self, tick: u64) {
        let entities = std::mem::take(&mut self.pending);
        self.completed = Some(Frame {
            tick,
            time: 0.0,
            entities,
        });
    }
}

// --- Traits ---
/// Serializes a frame into a line of text.
pub trait Serializer: Send + Sync {
    fn serialize(&self, frame: &Frame) -> Result<String, TransportError>;
}

/// Sends serialized data to a destination.
pub trait Sender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;
}

// --- Serializers ---

/// Serializes frames as JSON.
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, frame: &Frame) -> Result<String, TransportError> {
        Ok(serde_json::to_string(frame)?)
    }
}

/// Serializes frames to a compact little-endian layout, base64 encoded:
/// - 8 bytes: tick as u64
/// - 8 bytes: time as f64
/// - 4 bytes: entity count as u32
/// - For each entity:
///   - 8 bytes: entity ID as u64
///   - 12 bytes: position as 3 x f32
///   - 16 bytes: orientation as 4 x f32 (x, y, z, w)
pub struct BinarySerializer;

impl BinarySerializer {
    pub const HEADER_BYTES: usize = 8 + 8 + 4;
    pub const ENTITY_BYTES: usize = 8 + 12 + 16;

    pub fn encode(frame: &Frame) -> BytesMut {
        let mut buffer =
            BytesMut::with_capacity(Self::HEADER_BYTES + frame.entities.len() * Self::ENTITY_BYTES);

        buffer.put_u64_le(frame.tick);
        buffer.put_f64_le(frame.time);
        buffer.put_u32_le(frame.entities.len() as u32);

        for record in &frame.entities {
            buffer.put_u64_le(record.id.value());
            for v in record.position.to_array() {
                buffer.put_f32_le(v);
            }
            for v in record.orientation.to_array() {
                buffer.put_f32_le(v);
            }
        }

        buffer
    }
}

impl Serializer for BinarySerializer {
    fn serialize(&self, frame: &Frame) -> Result<String, TransportError> {
        Ok(base64::encode(Self::encode(frame)))
    }
}

// --- Senders ---

/// Sends data to standard output, one frame per line.
pub struct StdoutSender {
    stdout: io::Stdout,
}

impl StdoutSender {
    pub fn new() -> Self {
        StdoutSender { stdout: io::stdout() }
    }
}

impl Default for StdoutSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for StdoutSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut handle = self.stdout.lock();
        handle.write_all(data)?;
        handle.write_all(b"\n")?;
        handle.flush()?;
        Ok(())
    }
}

/// Appends frames to a file, one per line.
pub struct FileSender {
    writer: BufWriter<File>,
}

impl FileSender {
    pub fn create(path: &Path) -> Result<Self, TransportError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSender {
            writer: BufWriter::new(file),
        })
    }
}

impl Sender for FileSender {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(data)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Discards everything.
#[derive(Default)]
pub struct NullSender;

impl Sender for NullSender {
    fn send(&mut self, _data: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }
}
