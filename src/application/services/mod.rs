//! Application services orchestrating the domain.

pub mod asset_service;
pub mod redirect_service;
pub mod template_service;

pub use asset_service::{AssetService, CompleteUpload, StorageClass, UploadSession};
pub use redirect_service::{RedirectOutcome, RedirectService};
pub use template_service::TemplateService;
