//! 서버 측 상태 서비스.

pub mod registry;

pub use registry::{LabelReservation, RegistryError, SeriesRegistry, SERIES_REMOVED};
