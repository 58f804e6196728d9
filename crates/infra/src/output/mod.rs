//! Output artifact downloads

mod fetcher;

pub use fetcher::{DownloadReport, DownloadTarget, OutputFetcher, OverwritePolicy};
