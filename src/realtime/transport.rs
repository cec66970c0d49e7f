use std::sync::mpsc::Sender;

use crate::domain::channel::{ChannelEvent, EventFilter};

/// Opaque handle for an open transport channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportHandle(u64);

impl TransportHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server refused or never confirmed the subscription.
    NotConfirmed,
    Unavailable,
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfirmed => "TRANSPORT_NOT_CONFIRMED",
            Self::Unavailable => "TRANSPORT_UNAVAILABLE",
        }
    }
}

/// An event tagged with the subscription generation that received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub generation: u64,
    pub event: ChannelEvent,
}

/// Where a transport pushes events for one subscription.
#[derive(Debug, Clone)]
pub struct DeliverySink {
    generation: u64,
    tx: Sender<Delivery>,
}

impl DeliverySink {
    pub fn new(generation: u64, tx: Sender<Delivery>) -> Self {
        Self { generation, tx }
    }

    /// Returns false once the receiving side is gone.
    pub fn deliver(&self, event: ChannelEvent) -> bool {
        self.tx
            .send(Delivery {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

/// Push channel transport. Implementations never retry on their own.
pub trait ChannelTransport {
    fn open(
        &self,
        channel_key: &str,
        filter: EventFilter,
        sink: DeliverySink,
    ) -> Result<TransportHandle, TransportError>;

    fn close(&self, handle: TransportHandle);
}
