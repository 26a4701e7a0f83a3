//! Head and controller tracking history

pub mod history;

pub use history::PoseHistory;
