mod controller;
mod pager;
mod service;

pub use controller::{sort_items, GalleryController, GalleryEvent, LoadCompletion, LoadOutcome};
pub use pager::{DetailCard, DetailPager};
pub use service::{GalleryService, HttpGalleryService, MissingGalleryService};
