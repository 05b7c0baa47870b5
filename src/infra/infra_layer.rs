// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "sheets/sheets_client.rs"]
pub mod sheets;

#[path = "settings/json_store.rs"]
pub mod settings;
