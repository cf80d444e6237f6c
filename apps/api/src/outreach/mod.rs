pub mod copy;
pub mod handlers;
pub mod json_extract;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod qa;
pub mod research;
#[cfg(test)]
pub mod testing;
pub mod tone;
pub mod validation;
