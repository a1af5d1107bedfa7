//! Address extraction, span bookkeeping and section classification for
//! network-device configuration audits.

pub mod address;
pub mod classify;
pub mod format;
pub mod group;
pub mod hierarchy;
pub mod project;
pub mod span;

pub use address::{
    extract_addresses, extract_ipv4_address, extract_ipv4_network, AddressError, ExtractError,
    ExtractOptions,
};
pub use classify::{ClassifiedLine, Classifier, Level, Policy, DEFAULT_WINDOW};
pub use group::{Annotation, GroupError, LeveledGroup};
pub use hierarchy::TreeBuilder;
pub use project::{
    AddressProjector, Comparison, NetworkProjector, PatternProjector, Projection, Projector,
};
pub use span::{Span, SpanError, SpanKind, Validity};
