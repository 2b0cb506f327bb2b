pub mod null;
pub mod sparkpost;
