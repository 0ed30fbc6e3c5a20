//! HTTP handlers.

pub mod assets;
pub mod health;
pub mod redirect;

pub use assets::{
    delete_prefix_handler, multipart_abort_handler, multipart_complete_handler,
    multipart_create_handler, multipart_part_handler, upload_small_handler,
};
pub use health::health_handler;
pub use redirect::redirect_handler;
