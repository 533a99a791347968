pub mod jobs;
pub mod trace;
