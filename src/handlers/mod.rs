mod aquariums;
mod details;
mod health;
mod metrics;
mod parameters;
mod query;
mod users;

pub use aquariums::{
    create_aquarium_handler, delete_aquarium_handler, get_aquarium_handler,
    list_aquariums_handler, update_aquarium_handler,
};
pub use details::{all_details_handler, detail_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use parameters::{create_entry_handler, list_entries_handler};
pub use query::query_handler;
pub use users::{login_handler, oauth_handler, register_handler};
