//! I/O subsystem for the midithru pass-through utility.
//!
//! Port registry over midir, the multiplexed input wait handle, the
//! pass-through engine, and the durable port-selection config.

pub mod error;
pub use error::{Error, Result};

mod backend;
pub use backend::{MessageCallback, MidirBackend, PortBackend};

mod channel;
pub use channel::{event_channel, event_channel_with_capacity, EventReceiver, EventSender};

mod mux;
pub use mux::{InputMux, InputProducer};

mod registry;
pub use registry::{OpenSummary, PortRegistry, ReadMode};

mod engine;
pub use engine::{EventPorts, PassThroughEngine};

pub mod config;
pub use config::PortConfig;
