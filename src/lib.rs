pub mod assets;
pub mod config;
pub mod convert;
pub mod document;
pub mod export;
pub mod net;
pub mod utils;

pub use assets::{DownloadQueue, HttpDownloader};
pub use config::ExportConfig;
pub use convert::{ConvertContext, ConvertError, convert_document};
pub use document::{DocumentMapping, DocumentRecord, load_records};
pub use export::{ExportReport, export_all, export_with};
pub use net::{HttpClient, NetError, RedirectLookup};
