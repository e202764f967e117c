use crate::error::Error;

/// One decoded unit of an event stream.
#[derive(Debug)]
pub enum StreamEvent<T> {
    /// A fully parsed `data:` payload.
    Chunk(T),
    /// The `[DONE]` sentinel. Delivered once, always last.
    Done,
    /// A `data:` payload that failed to parse. The stream keeps going.
    Failed(Error),
}

impl<T> StreamEvent<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Chunk(_) => "chunk",
            StreamEvent::Done => "done",
            StreamEvent::Failed(_) => "failed",
        }
    }
}
