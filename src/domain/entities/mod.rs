//! Core business entities.

pub mod asset;
pub mod link;
pub mod template;
pub mod visit;

pub use asset::{AssetPayload, AssetRow, NewAsset, NewAssetStorage, TemplateAsset};
pub use link::ResolvedLink;
pub use template::{RedirectTemplate, TemplateRow, TemplateSource};
pub use visit::{BlockReason, NewVisitEvent};
