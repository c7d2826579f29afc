pub mod tapwater_client;
