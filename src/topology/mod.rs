//! What the broker knows about the world: reachable replication servers and our own progress.
mod advertisement;
mod progress;
mod tracker;
mod wire;

pub use advertisement::Advertisement;
pub use advertisement::AdvertisementError;
pub(crate) use progress::LocalProgress;
pub(crate) use tracker::TopologyTracker;
