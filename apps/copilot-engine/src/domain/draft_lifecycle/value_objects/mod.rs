//! Draft Lifecycle Value Objects

mod draft_status;

pub use draft_status::DraftStatus;
