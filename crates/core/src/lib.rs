pub mod model;
pub mod parsers;
pub mod scroll;
pub mod svg;
pub mod views;
