//! Rule records, builder form state, templates and the project document.

pub mod form;
pub mod project;
pub mod rule;
pub mod template;
