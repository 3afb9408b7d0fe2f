// file: src/workflow/mod.rs
// description: Workflow file generation module exports
// reference: Internal module structure

pub mod writer;

pub use writer::{WORKFLOW_PATH, render_workflow, workflow_document, write_workflow};
