pub mod config;
pub mod drafts;
pub mod report;
pub mod review;
pub mod session;

pub mod error;
