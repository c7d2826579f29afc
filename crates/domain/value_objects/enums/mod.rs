pub mod payment_states;
