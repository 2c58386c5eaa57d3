pub mod collection;
pub mod content_point;
pub mod source_item;
