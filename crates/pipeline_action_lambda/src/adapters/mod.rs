pub mod aws;
pub mod job_status;
pub mod object_store;
