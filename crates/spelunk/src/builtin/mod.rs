//! Sources and modifiers registered by default

pub mod modifier;
pub mod source;
