mod database;
mod notifier;
mod state_builder;

pub use database::connect_and_migrate;
pub use notifier::build_notifier;
pub use state_builder::{RepositorySet, build_app_state};
