//! Hund API surface: the REST client and wire conversions shared by every
//! resource.

pub mod client;
pub mod i18n;
pub mod timestamp;

pub use client::{HundApi, HundClient};
pub use i18n::I18nString;
