pub mod assemble_updater;
pub mod build_app;
