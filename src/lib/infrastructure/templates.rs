//! Template engines

pub mod handlebars;
