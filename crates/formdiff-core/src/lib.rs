pub mod annotate;
pub mod compose;
pub mod consts;
pub mod error;
pub mod frame;
pub mod jobs;
pub mod pipeline;
pub mod pose;
pub mod region;
pub mod scoring;
pub mod selection;
pub mod video;
