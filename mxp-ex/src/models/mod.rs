//! Data models for export jobs and media types

pub mod export_job;
pub mod media_type;

pub use export_job::{
    ExportFormat, ExportJob, ExportJobRow, ExportRequest, ExportSelector, JobPage, JobStatus,
    NewExportJob,
};
pub use media_type::MediaType;
