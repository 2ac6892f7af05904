pub mod auth;
pub mod content;
pub mod input;
pub mod items;
pub mod list;
pub mod locales;
pub mod output;
pub mod publish;
pub mod schema;

pub use output::Output;
