pub mod tapwater;
