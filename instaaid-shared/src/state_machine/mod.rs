pub mod login_flow;
