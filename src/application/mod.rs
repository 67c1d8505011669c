pub mod track;

pub use track::TrackingService;
